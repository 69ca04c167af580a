//! Pull request lifecycle: creation, reviewer reassignment and merge.
//!
//! A pull request is created `OPEN`, may have reviewers swapped while open,
//! and is frozen by merge. There is no way back from `MERGED`.

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
  Error, Result,
  assign::{self, Replacement},
  model::{NewPullRequest, PullRequest, PullRequestId, PullRequestStatus, UserId},
  store::{PullRequestStore, SlotWrite, UserStore},
};

/// Result of [`Lifecycle::reassign`].
#[derive(Debug, Clone, Serialize)]
pub struct Reassignment {
  #[serde(rename = "pr")]
  pub pull_request: PullRequest,
  /// The reviewer now holding the freed slot.
  pub replaced_by:  UserId,
}

/// Orchestrates pull request state changes over a store.
///
/// Cloning is cheap; the store is shared.
pub struct Lifecycle<S> {
  store: Arc<S>,
}

impl<S> Clone for Lifecycle<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> Lifecycle<S>
where
  S: PullRequestStore + UserStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Create a pull request and attach up to two reviewers from the author's
  /// team.
  ///
  /// A team with no eligible teammates is a successful creation with an
  /// empty reviewer list.
  pub async fn create(&self, input: NewPullRequest) -> Result<PullRequest> {
    let pr = PullRequest {
      pull_request_id:    input.pull_request_id,
      pull_request_name:  input.pull_request_name,
      author_id:          input.author_id,
      status:             PullRequestStatus::Open,
      assigned_reviewers: Vec::new(),
      created_at:         input.created_at.unwrap_or_else(Utc::now),
      merged_at:          None,
    };

    let created = self
      .store
      .create_pull_request(&pr)
      .await
      .map_err(Error::store)?;
    if !created {
      return Err(Error::PullRequestExists(pr.pull_request_id));
    }

    let author = self
      .store
      .get_user(&pr.author_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UserNotFound(pr.author_id.clone()))?;

    let pool = self
      .store
      .list_active_by_team(&author.team_name)
      .await
      .map_err(Error::store)?;

    let reviewers = assign::select_initial_reviewers(&pr.author_id, &pool);
    debug!(
      pull_request = %pr.pull_request_id,
      team = %author.team_name,
      pool = pool.len(),
      ?reviewers,
      "selected initial reviewers"
    );

    if !reviewers.is_empty() {
      self
        .store
        .assign_reviewers(&pr.pull_request_id, &reviewers)
        .await
        .map_err(Error::store)?;
    }

    let stored = self.load(&pr.pull_request_id).await?;
    info!(
      pull_request = %stored.pull_request_id,
      author = %stored.author_id,
      reviewers = stored.assigned_reviewers.len(),
      "pull request created"
    );
    Ok(stored)
  }

  /// Swap `old` out of the pull request's reviewers for another active
  /// member of `old`'s team.
  ///
  /// When the only remaining candidate is already a reviewer, that reviewer
  /// is moved into `old`'s slot and its previous slot is vacated, so the
  /// reviewer count drops by one.
  ///
  /// The slot write is conditional: a merge or another reassignment that
  /// lands between the reads above and the write makes it fail with
  /// [`Error::AlreadyMerged`], [`Error::NotAssigned`] or
  /// [`Error::ReviewerTaken`] and leaves the reviewers untouched.
  pub async fn reassign(
    &self,
    id: &PullRequestId,
    old: &UserId,
  ) -> Result<Reassignment> {
    let pr = self.load(id).await?;
    if pr.is_merged() {
      return Err(Error::AlreadyMerged(id.clone()));
    }

    let current = self.store.list_reviewers(id).await.map_err(Error::store)?;
    if !current.contains(old) {
      return Err(Error::NotAssigned {
        pull_request: id.clone(),
        reviewer:     old.clone(),
      });
    }

    let old_user = self
      .store
      .get_user(old)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UserNotFound(old.clone()))?;

    let pool = self
      .store
      .list_active_by_team(&old_user.team_name)
      .await
      .map_err(Error::store)?;

    let assigned: HashSet<UserId> = current.into_iter().collect();
    let replacement =
      assign::select_replacement(&pr.author_id, old, &assigned, &pool)
        .ok_or_else(|| Error::NoCandidate {
          pull_request: id.clone(),
          reviewer:     old.clone(),
        })?;
    debug!(pull_request = %id, %old, ?replacement, "selected replacement");

    let write = match &replacement {
      Replacement::Fresh(new) => self.store.reassign_reviewer(id, old, new).await,
      Replacement::Reused(new) => self.store.move_reviewer(id, old, new).await,
    }
    .map_err(Error::store)?;

    let new = replacement.into_user_id();
    match write {
      SlotWrite::Written => {}
      SlotWrite::Merged => return Err(Error::AlreadyMerged(id.clone())),
      SlotWrite::NotAssigned => {
        return Err(Error::NotAssigned {
          pull_request: id.clone(),
          reviewer:     old.clone(),
        });
      }
      SlotWrite::Occupied => {
        return Err(Error::ReviewerTaken {
          pull_request: id.clone(),
          reviewer:     new,
        });
      }
    }

    let pull_request = self.load(id).await?;
    info!(pull_request = %id, %old, %new, "reviewer reassigned");
    Ok(Reassignment { pull_request, replaced_by: new })
  }

  /// Merge the pull request. Merging an already merged pull request returns
  /// it unchanged.
  pub async fn merge(&self, id: &PullRequestId) -> Result<PullRequest> {
    let pr = self.load(id).await?;
    if pr.is_merged() {
      debug!(pull_request = %id, "already merged");
      return Ok(pr);
    }

    let found = self
      .store
      .merge_pull_request(id, Utc::now())
      .await
      .map_err(Error::store)?;
    if !found {
      return Err(Error::PullRequestNotFound(id.clone()));
    }

    let merged = self.load(id).await?;
    info!(pull_request = %id, "pull request merged");
    Ok(merged)
  }

  async fn load(&self, id: &PullRequestId) -> Result<PullRequest> {
    self
      .store
      .get_pull_request(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::PullRequestNotFound(id.clone()))
  }
}
