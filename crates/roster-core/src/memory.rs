//! In-memory implementation of the storage ports.
//!
//! All state sits behind a single `RwLock`, so each port call is atomic with
//! respect to every other. Nothing survives a restart.

use std::convert::Infallible;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
  model::{PullRequest, PullRequestId, PullRequestStatus, Team, User, UserId},
  store::{PullRequestStore, SlotWrite, Store, TeamStore, UserStore},
};

#[derive(Default)]
struct Inner {
  teams:         Vec<String>,
  /// Roster order is insertion order.
  users:         Vec<User>,
  pull_requests: Vec<PullRequest>,
}

impl Inner {
  fn pull_request_mut(&mut self, id: &PullRequestId) -> Option<&mut PullRequest> {
    self.pull_requests.iter_mut().find(|pr| &pr.pull_request_id == id)
  }

  fn open_pull_request_mut(&mut self, id: &PullRequestId) -> Option<&mut PullRequest> {
    self.pull_request_mut(id).filter(|pr| !pr.is_merged())
  }

  /// Put `new` into `old`'s slot. With `vacate`, a slot already held by
  /// `new` is dropped; without it the write is refused.
  fn write_slot(
    &mut self,
    id: &PullRequestId,
    old: &UserId,
    new: &UserId,
    vacate: bool,
  ) -> SlotWrite {
    let Some(pr) = self.pull_request_mut(id) else {
      return SlotWrite::NotAssigned;
    };
    if pr.is_merged() {
      return SlotWrite::Merged;
    }
    let reviewers = &mut pr.assigned_reviewers;
    let Some(at) = reviewers.iter().position(|r| r == old) else {
      return SlotWrite::NotAssigned;
    };

    let held = reviewers.iter().position(|r| r == new).filter(|&i| i != at);
    if held.is_some() && !vacate {
      return SlotWrite::Occupied;
    }
    reviewers[at] = new.clone();
    if let Some(i) = held {
      reviewers.remove(i);
    }
    SlotWrite::Written
  }
}

#[derive(Default)]
pub struct MemoryStore {
  inner: RwLock<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl Store for MemoryStore {
  type Error = Infallible;
}

impl TeamStore for MemoryStore {
  async fn create_team(&self, team_name: &str) -> Result<bool, Infallible> {
    let mut inner = self.inner.write().await;
    if inner.teams.iter().any(|t| t == team_name) {
      return Ok(false);
    }
    inner.teams.push(team_name.to_owned());
    Ok(true)
  }

  async fn get_team(&self, team_name: &str) -> Result<Option<Team>, Infallible> {
    let inner = self.inner.read().await;
    if !inner.teams.iter().any(|t| t == team_name) {
      return Ok(None);
    }
    let members = inner
      .users
      .iter()
      .filter(|u| u.team_name == team_name)
      .cloned()
      .map(Into::into)
      .collect();
    Ok(Some(Team { team_name: team_name.to_owned(), members }))
  }
}

impl UserStore for MemoryStore {
  async fn upsert_user(&self, user: User) -> Result<(), Infallible> {
    let mut inner = self.inner.write().await;
    match inner.users.iter().position(|u| u.user_id == user.user_id) {
      Some(i) => inner.users[i] = user,
      None => inner.users.push(user),
    }
    Ok(())
  }

  async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Infallible> {
    let inner = self.inner.read().await;
    Ok(inner.users.iter().find(|u| &u.user_id == user_id).cloned())
  }

  async fn list_active_by_team(
    &self,
    team_name: &str,
  ) -> Result<Vec<User>, Infallible> {
    let inner = self.inner.read().await;
    Ok(
      inner
        .users
        .iter()
        .filter(|u| u.is_active && u.team_name == team_name)
        .cloned()
        .collect(),
    )
  }

  async fn set_user_active(
    &self,
    user_id: &UserId,
    is_active: bool,
  ) -> Result<Option<User>, Infallible> {
    let mut inner = self.inner.write().await;
    Ok(inner.users.iter_mut().find(|u| &u.user_id == user_id).map(|u| {
      u.is_active = is_active;
      u.clone()
    }))
  }
}

impl PullRequestStore for MemoryStore {
  async fn create_pull_request(&self, pr: &PullRequest) -> Result<bool, Infallible> {
    let mut inner = self.inner.write().await;
    if inner.pull_request_mut(&pr.pull_request_id).is_some() {
      return Ok(false);
    }
    inner.pull_requests.push(PullRequest {
      assigned_reviewers: Vec::new(),
      ..pr.clone()
    });
    Ok(true)
  }

  async fn get_pull_request(
    &self,
    id: &PullRequestId,
  ) -> Result<Option<PullRequest>, Infallible> {
    let inner = self.inner.read().await;
    Ok(inner.pull_requests.iter().find(|pr| &pr.pull_request_id == id).cloned())
  }

  async fn assign_reviewers(
    &self,
    id: &PullRequestId,
    reviewers: &[UserId],
  ) -> Result<(), Infallible> {
    let mut inner = self.inner.write().await;
    if let Some(pr) = inner.open_pull_request_mut(id) {
      for r in reviewers {
        if !pr.assigned_reviewers.contains(r) {
          pr.assigned_reviewers.push(r.clone());
        }
      }
    }
    Ok(())
  }

  async fn list_reviewers(&self, id: &PullRequestId) -> Result<Vec<UserId>, Infallible> {
    let inner = self.inner.read().await;
    Ok(
      inner
        .pull_requests
        .iter()
        .find(|pr| &pr.pull_request_id == id)
        .map(|pr| pr.assigned_reviewers.clone())
        .unwrap_or_default(),
    )
  }

  async fn reassign_reviewer(
    &self,
    id: &PullRequestId,
    old: &UserId,
    new: &UserId,
  ) -> Result<SlotWrite, Infallible> {
    Ok(self.inner.write().await.write_slot(id, old, new, false))
  }

  async fn move_reviewer(
    &self,
    id: &PullRequestId,
    old: &UserId,
    reviewer: &UserId,
  ) -> Result<SlotWrite, Infallible> {
    Ok(self.inner.write().await.write_slot(id, old, reviewer, true))
  }

  async fn remove_reviewer(
    &self,
    id: &PullRequestId,
    reviewer: &UserId,
  ) -> Result<(), Infallible> {
    let mut inner = self.inner.write().await;
    if let Some(pr) = inner.open_pull_request_mut(id) {
      pr.assigned_reviewers.retain(|r| r != reviewer);
    }
    Ok(())
  }

  async fn merge_pull_request(
    &self,
    id: &PullRequestId,
    at: DateTime<Utc>,
  ) -> Result<bool, Infallible> {
    let mut inner = self.inner.write().await;
    let Some(pr) = inner.pull_request_mut(id) else {
      return Ok(false);
    };
    pr.status = PullRequestStatus::Merged;
    pr.merged_at.get_or_insert(at);
    Ok(true)
  }

  async fn list_by_reviewer(
    &self,
    reviewer: &UserId,
  ) -> Result<Vec<PullRequest>, Infallible> {
    let inner = self.inner.read().await;
    Ok(
      inner
        .pull_requests
        .iter()
        .filter(|pr| pr.assigned_reviewers.contains(reviewer))
        .cloned()
        .collect(),
    )
  }
}
