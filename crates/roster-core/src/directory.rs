//! Team and user directory: thin orchestration over the store.

use std::sync::Arc;

use tracing::info;

use crate::{
  Error, Result,
  model::{PullRequest, Team, User, UserId},
  store::{PullRequestStore, TeamStore, UserStore},
};

pub struct Directory<S> {
  store: Arc<S>,
}

impl<S> Clone for Directory<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> Directory<S>
where
  S: TeamStore + UserStore + PullRequestStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Create a team and upsert each member into it.
  ///
  /// Fails without touching any user if the team name is taken. A failing
  /// member upsert aborts the loop; members written before it stay written.
  pub async fn create_team(&self, team: Team) -> Result<Team> {
    let created = self
      .store
      .create_team(&team.team_name)
      .await
      .map_err(Error::store)?;
    if !created {
      return Err(Error::TeamExists(team.team_name));
    }

    for user in team.users() {
      self.store.upsert_user(user).await.map_err(Error::store)?;
    }

    info!(team = %team.team_name, members = team.members.len(), "team created");
    Ok(team)
  }

  pub async fn get_team(&self, team_name: &str) -> Result<Team> {
    self
      .store
      .get_team(team_name)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::TeamNotFound(team_name.to_owned()))
  }

  /// Existing reviewer assignments are left as they are.
  pub async fn set_user_active(
    &self,
    user_id: &UserId,
    is_active: bool,
  ) -> Result<User> {
    let user = self
      .store
      .set_user_active(user_id, is_active)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UserNotFound(user_id.clone()))?;
    info!(user = %user_id, is_active, "user activity changed");
    Ok(user)
  }

  pub async fn list_pull_requests_for_reviewer(
    &self,
    reviewer: &UserId,
  ) -> Result<Vec<PullRequest>> {
    self
      .store
      .get_user(reviewer)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UserNotFound(reviewer.clone()))?;

    self.store.list_by_reviewer(reviewer).await.map_err(Error::store)
  }
}
