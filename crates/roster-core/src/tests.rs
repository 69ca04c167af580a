//! Service-level tests for `Lifecycle` and `Directory` over `MemoryStore`.

use std::{collections::HashSet, convert::Infallible, sync::Arc};

use chrono::{DateTime, TimeZone as _, Utc};

use crate::{
  Directory, Error, ErrorKind, Lifecycle, MemoryStore,
  model::{
    NewPullRequest, PullRequest, PullRequestId, PullRequestStatus, Team,
    TeamMember, User, UserId,
  },
  store::{PullRequestStore, SlotWrite, Store, TeamStore, UserStore},
};

fn team(name: &str, members: &[(&str, bool)]) -> Team {
  Team {
    team_name: name.into(),
    members:   members
      .iter()
      .map(|(id, active)| TeamMember {
        user_id:   UserId::from(*id),
        username:  format!("name-{id}"),
        is_active: *active,
      })
      .collect(),
  }
}

fn ids(ids: &[&str]) -> Vec<UserId> {
  ids.iter().map(|id| UserId::from(*id)).collect()
}

async fn setup(
  teams: &[Team],
) -> (Arc<MemoryStore>, Lifecycle<MemoryStore>, Directory<MemoryStore>) {
  let store = Arc::new(MemoryStore::new());
  let directory = Directory::new(store.clone());
  for t in teams {
    directory.create_team(t.clone()).await.unwrap();
  }
  (store.clone(), Lifecycle::new(store), directory)
}

fn assert_no_duplicates(pr: &PullRequest) {
  let unique: HashSet<_> = pr.assigned_reviewers.iter().collect();
  assert_eq!(unique.len(), pr.assigned_reviewers.len(), "{pr:?}");
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_first_two_teammates() {
  let (_, lifecycle, _) = setup(&[team(
    "backend",
    &[("author", true), ("u1", true), ("u2", true)],
  )])
  .await;

  let pr = lifecycle
    .create(NewPullRequest::new("pr-1", "Add search", "author"))
    .await
    .unwrap();

  assert_eq!(pr.status, PullRequestStatus::Open);
  assert_eq!(pr.assigned_reviewers, ids(&["u1", "u2"]));
  assert!(pr.merged_at.is_none());
}

#[tokio::test]
async fn create_in_two_person_team_assigns_one() {
  let (_, lifecycle, _) =
    setup(&[team("small", &[("a1", true), ("a2", true)])]).await;

  let pr = lifecycle
    .create(NewPullRequest::new("pr-small", "Fix typo", "a1"))
    .await
    .unwrap();
  assert_eq!(pr.assigned_reviewers, ids(&["a2"]));
}

#[tokio::test]
async fn create_in_solo_team_succeeds_without_reviewers() {
  let (_, lifecycle, _) = setup(&[team("solo", &[("s1", true)])]).await;

  let pr = lifecycle
    .create(NewPullRequest::new("pr-solo", "Bump deps", "s1"))
    .await
    .unwrap();
  assert!(pr.assigned_reviewers.is_empty());
  assert_eq!(pr.status, PullRequestStatus::Open);
}

#[tokio::test]
async fn create_skips_inactive_teammates() {
  let (_, lifecycle, _) = setup(&[team(
    "backend",
    &[("author", true), ("u1", false), ("u2", true), ("u3", true)],
  )])
  .await;

  let pr = lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();
  assert_eq!(pr.assigned_reviewers, ids(&["u2", "u3"]));
}

#[tokio::test]
async fn create_with_duplicate_id_fails() {
  let (_, lifecycle, _) =
    setup(&[team("backend", &[("author", true), ("u1", true)])]).await;

  lifecycle
    .create(NewPullRequest::new("pr-1", "first", "author"))
    .await
    .unwrap();
  let err = lifecycle
    .create(NewPullRequest::new("pr-1", "second", "author"))
    .await
    .unwrap_err();

  assert!(matches!(err, Error::PullRequestExists(ref id) if id.as_str() == "pr-1"));
  assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn create_with_unknown_author_fails_not_found() {
  let (store, lifecycle, _) = setup(&[]).await;

  let err = lifecycle
    .create(NewPullRequest::new("pr-1", "x", "ghost"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
  assert_eq!(err.kind(), ErrorKind::NotFound);

  // The row is written before the author lookup.
  let stored = store
    .get_pull_request(&"pr-1".into())
    .await
    .unwrap()
    .unwrap();
  assert!(stored.assigned_reviewers.is_empty());
}

#[tokio::test]
async fn create_keeps_supplied_timestamp() {
  let (_, lifecycle, _) = setup(&[team("t", &[("a", true)])]).await;
  let at: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

  let mut input = NewPullRequest::new("pr-1", "x", "a");
  input.created_at = Some(at);
  let pr = lifecycle.create(input).await.unwrap();
  assert_eq!(pr.created_at, at);
}

#[tokio::test]
async fn create_defaults_timestamp_to_now() {
  let (_, lifecycle, _) = setup(&[team("t", &[("a", true)])]).await;
  let before = Utc::now();
  let pr = lifecycle
    .create(NewPullRequest::new("pr-1", "x", "a"))
    .await
    .unwrap();
  assert!(pr.created_at >= before);
  assert!(pr.created_at <= Utc::now());
}

// ─── Reassign ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reassign_picks_fresh_teammate() {
  let (store, lifecycle, _) =
    setup(&[team("backend", &[("author", true), ("u2", true)])]).await;
  let pr_id = PullRequestId::from("pr-1");

  let pr = lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();
  assert_eq!(pr.assigned_reviewers, ids(&["u2"]));

  store
    .upsert_user(User {
      user_id:   "u3".into(),
      username:  "name-u3".into(),
      team_name: "backend".into(),
      is_active: true,
    })
    .await
    .unwrap();

  let out = lifecycle.reassign(&pr_id, &"u2".into()).await.unwrap();
  assert_eq!(out.replaced_by, UserId::from("u3"));
  assert_eq!(out.pull_request.assigned_reviewers, ids(&["u3"]));
}

#[tokio::test]
async fn reassign_keeps_slot_position() {
  let (_, lifecycle, _) = setup(&[team(
    "backend",
    &[("author", true), ("u1", true), ("u2", true), ("u3", true)],
  )])
  .await;
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();

  let out = lifecycle
    .reassign(&"pr-1".into(), &"u1".into())
    .await
    .unwrap();
  assert_eq!(out.replaced_by, UserId::from("u3"));
  assert_eq!(out.pull_request.assigned_reviewers, ids(&["u3", "u2"]));
}

#[tokio::test]
async fn reassign_reuse_fallback_shrinks_reviewer_list() {
  let (_, lifecycle, _) = setup(&[team(
    "backend",
    &[("author", true), ("u2", true), ("u3", true)],
  )])
  .await;
  let pr = lifecycle
    .create(NewPullRequest::new("pr-small", "x", "author"))
    .await
    .unwrap();
  assert_eq!(pr.assigned_reviewers, ids(&["u2", "u3"]));

  let out = lifecycle
    .reassign(&"pr-small".into(), &"u2".into())
    .await
    .unwrap();
  assert_eq!(out.replaced_by, UserId::from("u3"));
  assert_eq!(out.pull_request.assigned_reviewers, ids(&["u3"]));
}

#[tokio::test]
async fn reassign_draws_from_old_reviewers_team() {
  let (store, lifecycle, _) = setup(&[
    team("backend", &[("author", true), ("u1", true)]),
    team("frontend", &[("f1", true), ("f2", true)]),
  ])
  .await;
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();

  // u1 moves teams after being assigned.
  store
    .upsert_user(User {
      user_id:   "u1".into(),
      username:  "name-u1".into(),
      team_name: "frontend".into(),
      is_active: true,
    })
    .await
    .unwrap();

  let out = lifecycle
    .reassign(&"pr-1".into(), &"u1".into())
    .await
    .unwrap();
  assert_eq!(out.replaced_by, UserId::from("f1"));
}

#[tokio::test]
async fn reassign_unknown_pull_request_fails() {
  let (_, lifecycle, _) = setup(&[]).await;
  let err = lifecycle
    .reassign(&"nope".into(), &"u1".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PullRequestNotFound(_)));
}

#[tokio::test]
async fn reassign_unassigned_reviewer_fails() {
  let (_, lifecycle, _) = setup(&[team(
    "backend",
    &[("author", true), ("u1", true), ("u2", true), ("u3", true)],
  )])
  .await;
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();

  let err = lifecycle
    .reassign(&"pr-1".into(), &"u3".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotAssigned { .. }));
  assert_eq!(err.kind(), ErrorKind::NotAssigned);
}

#[tokio::test]
async fn reassign_without_candidates_fails() {
  let (_, lifecycle, _) =
    setup(&[team("small", &[("a1", true), ("a2", true)])]).await;
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "a1"))
    .await
    .unwrap();

  let err = lifecycle
    .reassign(&"pr-1".into(), &"a2".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NoCandidate { .. }));
  assert_eq!(err.kind(), ErrorKind::NoCandidate);
}

#[tokio::test]
async fn reassign_ignores_deactivated_teammates() {
  let (_, lifecycle, directory) = setup(&[team(
    "backend",
    &[("author", true), ("u1", true), ("u2", true)],
  )])
  .await;
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();
  directory.set_user_active(&"u2".into(), false).await.unwrap();

  // u2 is stale but still listed; it may not be picked as a replacement.
  let err = lifecycle
    .reassign(&"pr-1".into(), &"u1".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NoCandidate { .. }));
}

#[tokio::test]
async fn repeated_reassignment_never_duplicates() {
  let (_, lifecycle, _) = setup(&[team(
    "backend",
    &[("author", true), ("u1", true), ("u2", true), ("u3", true), ("u4", true)],
  )])
  .await;
  let pr_id = PullRequestId::from("pr-1");
  let mut pr = lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();

  for round in 0..8 {
    let target = pr.assigned_reviewers[round % pr.assigned_reviewers.len()].clone();
    pr = lifecycle.reassign(&pr_id, &target).await.unwrap().pull_request;

    assert_no_duplicates(&pr);
    assert_eq!(pr.assigned_reviewers.len(), 2);
    assert!(!pr.assigned_reviewers.contains(&"author".into()));
    assert!(!pr.assigned_reviewers.contains(&target));
  }
}

// ─── Merge ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn merge_is_idempotent() {
  let (_, lifecycle, _) =
    setup(&[team("backend", &[("author", true), ("u1", true)])]).await;
  let pr_id = PullRequestId::from("pr-1");
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();

  let first = lifecycle.merge(&pr_id).await.unwrap();
  assert_eq!(first.status, PullRequestStatus::Merged);
  let merged_at = first.merged_at.expect("merged_at set");
  assert!(merged_at >= first.created_at);

  let second = lifecycle.merge(&pr_id).await.unwrap();
  assert_eq!(second.status, PullRequestStatus::Merged);
  assert_eq!(second.merged_at, Some(merged_at));
}

#[tokio::test]
async fn reassign_after_merge_fails_and_leaves_reviewers() {
  let (_, lifecycle, _) = setup(&[team(
    "backend",
    &[("author", true), ("u1", true), ("u2", true), ("u3", true)],
  )])
  .await;
  let pr_id = PullRequestId::from("pr-1");
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();
  let merged = lifecycle.merge(&pr_id).await.unwrap();
  let again = lifecycle.merge(&pr_id).await.unwrap();
  assert_eq!(again.merged_at, merged.merged_at);

  let err = lifecycle.reassign(&pr_id, &"u1".into()).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyMerged(_)));
  assert_eq!(err.kind(), ErrorKind::AlreadyMerged);

  let after = lifecycle.merge(&pr_id).await.unwrap();
  assert_eq!(after.assigned_reviewers, ids(&["u1", "u2"]));
}

#[tokio::test]
async fn merge_unknown_pull_request_fails() {
  let (_, lifecycle, _) = setup(&[]).await;
  let err = lifecycle.merge(&"nope".into()).await.unwrap_err();
  assert!(matches!(err, Error::PullRequestNotFound(_)));
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_team_upserts_members() {
  let (store, _, directory) = setup(&[]).await;
  directory
    .create_team(team("backend", &[("u1", true), ("u2", false)]))
    .await
    .unwrap();

  let u2 = store.get_user(&"u2".into()).await.unwrap().unwrap();
  assert_eq!(u2.team_name, "backend");
  assert!(!u2.is_active);

  let fetched = directory.get_team("backend").await.unwrap();
  assert_eq!(fetched.members.len(), 2);
  assert_eq!(fetched.members[0].user_id, UserId::from("u1"));
}

#[tokio::test]
async fn create_existing_team_fails_without_upserts() {
  let (store, _, directory) =
    setup(&[team("backend", &[("u1", true)])]).await;

  let err = directory
    .create_team(team("backend", &[("u1", false), ("u9", true)]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TeamExists(_)));

  assert!(store.get_user(&"u9".into()).await.unwrap().is_none());
  assert!(store.get_user(&"u1".into()).await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn get_unknown_team_fails() {
  let (_, _, directory) = setup(&[]).await;
  let err = directory.get_team("nope").await.unwrap_err();
  assert!(matches!(err, Error::TeamNotFound(_)));
}

#[tokio::test]
async fn set_user_active_does_not_touch_assignments() {
  let (_, lifecycle, directory) = setup(&[team(
    "backend",
    &[("author", true), ("u1", true), ("u2", true)],
  )])
  .await;
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();

  let user = directory.set_user_active(&"u1".into(), false).await.unwrap();
  assert!(!user.is_active);

  let prs = directory
    .list_pull_requests_for_reviewer(&"u1".into())
    .await
    .unwrap();
  assert_eq!(prs.len(), 1);
  assert_eq!(prs[0].pull_request_id, PullRequestId::from("pr-1"));
}

#[tokio::test]
async fn set_unknown_user_active_fails() {
  let (_, _, directory) = setup(&[]).await;
  let err = directory
    .set_user_active(&"ghost".into(), true)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
}

#[tokio::test]
async fn list_for_unknown_reviewer_fails() {
  let (_, _, directory) = setup(&[]).await;
  let err = directory
    .list_pull_requests_for_reviewer(&"ghost".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
}

#[tokio::test]
async fn list_for_reviewer_without_assignments_is_empty() {
  let (_, _, directory) = setup(&[team("t", &[("u1", true)])]).await;
  let prs = directory
    .list_pull_requests_for_reviewer(&"u1".into())
    .await
    .unwrap();
  assert!(prs.is_empty());
}

// ─── MemoryStore slot writes ─────────────────────────────────────────────────

async fn store_with_pr(reviewers: &[&str]) -> (MemoryStore, PullRequestId) {
  let store = MemoryStore::new();
  let id = PullRequestId::from("pr-1");
  let pr = PullRequest {
    pull_request_id:    id.clone(),
    pull_request_name:  "x".into(),
    author_id:          "author".into(),
    status:             PullRequestStatus::Open,
    assigned_reviewers: Vec::new(),
    created_at:         Utc::now(),
    merged_at:          None,
  };
  assert!(store.create_pull_request(&pr).await.unwrap());
  store.assign_reviewers(&id, &ids(reviewers)).await.unwrap();
  (store, id)
}

#[tokio::test]
async fn reassign_reviewer_refuses_an_occupied_target() {
  let (store, id) = store_with_pr(&["u1", "u2"]).await;

  let write = store
    .reassign_reviewer(&id, &"u1".into(), &"u2".into())
    .await
    .unwrap();
  assert_eq!(write, SlotWrite::Occupied);
  assert_eq!(store.list_reviewers(&id).await.unwrap(), ids(&["u1", "u2"]));
}

#[tokio::test]
async fn reassign_reviewer_reports_missing_old() {
  let (store, id) = store_with_pr(&["u1"]).await;
  let write = store
    .reassign_reviewer(&id, &"u9".into(), &"u2".into())
    .await
    .unwrap();
  assert_eq!(write, SlotWrite::NotAssigned);

  let write = store
    .reassign_reviewer(&"nope".into(), &"u1".into(), &"u2".into())
    .await
    .unwrap();
  assert_eq!(write, SlotWrite::NotAssigned);
}

#[tokio::test]
async fn move_reviewer_vacates_its_old_slot() {
  let (store, id) = store_with_pr(&["u1", "u2"]).await;
  let write = store
    .move_reviewer(&id, &"u1".into(), &"u2".into())
    .await
    .unwrap();
  assert_eq!(write, SlotWrite::Written);
  assert_eq!(store.list_reviewers(&id).await.unwrap(), ids(&["u2"]));
}

#[tokio::test]
async fn merged_pull_request_rejects_every_reviewer_write() {
  let (store, id) = store_with_pr(&["u1", "u2"]).await;
  assert!(store.merge_pull_request(&id, Utc::now()).await.unwrap());

  let swap = store
    .reassign_reviewer(&id, &"u1".into(), &"u3".into())
    .await
    .unwrap();
  assert_eq!(swap, SlotWrite::Merged);
  let moved = store
    .move_reviewer(&id, &"u1".into(), &"u2".into())
    .await
    .unwrap();
  assert_eq!(moved, SlotWrite::Merged);
  store.remove_reviewer(&id, &"u1".into()).await.unwrap();
  store.assign_reviewers(&id, &ids(&["u4"])).await.unwrap();

  assert_eq!(store.list_reviewers(&id).await.unwrap(), ids(&["u1", "u2"]));
}

// ─── Wrapped store ───────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("injected failure")]
struct Injected;

/// Delegates to `MemoryStore`. Can refuse to upsert one particular user, and
/// can yield to the scheduler before every call so that two operations
/// joined on one task interleave call by call.
#[derive(Default)]
struct Wrapped {
  inner:      MemoryStore,
  fail_on:    Option<UserId>,
  interleave: bool,
}

impl Wrapped {
  async fn pause(&self) {
    if self.interleave {
      tokio::task::yield_now().await;
    }
  }
}

fn never(e: Infallible) -> Injected { match e {} }

impl Store for Wrapped {
  type Error = Injected;
}

impl TeamStore for Wrapped {
  async fn create_team(&self, team_name: &str) -> Result<bool, Injected> {
    self.pause().await;
    self.inner.create_team(team_name).await.map_err(never)
  }

  async fn get_team(&self, team_name: &str) -> Result<Option<Team>, Injected> {
    self.pause().await;
    self.inner.get_team(team_name).await.map_err(never)
  }
}

impl UserStore for Wrapped {
  async fn upsert_user(&self, user: User) -> Result<(), Injected> {
    self.pause().await;
    if self.fail_on.as_ref() == Some(&user.user_id) {
      return Err(Injected);
    }
    self.inner.upsert_user(user).await.map_err(never)
  }

  async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Injected> {
    self.pause().await;
    self.inner.get_user(user_id).await.map_err(never)
  }

  async fn list_active_by_team(&self, team_name: &str) -> Result<Vec<User>, Injected> {
    self.pause().await;
    self.inner.list_active_by_team(team_name).await.map_err(never)
  }

  async fn set_user_active(
    &self,
    user_id: &UserId,
    is_active: bool,
  ) -> Result<Option<User>, Injected> {
    self.pause().await;
    self.inner.set_user_active(user_id, is_active).await.map_err(never)
  }
}

impl PullRequestStore for Wrapped {
  async fn create_pull_request(&self, pr: &PullRequest) -> Result<bool, Injected> {
    self.pause().await;
    self.inner.create_pull_request(pr).await.map_err(never)
  }

  async fn get_pull_request(
    &self,
    id: &PullRequestId,
  ) -> Result<Option<PullRequest>, Injected> {
    self.pause().await;
    self.inner.get_pull_request(id).await.map_err(never)
  }

  async fn assign_reviewers(
    &self,
    id: &PullRequestId,
    reviewers: &[UserId],
  ) -> Result<(), Injected> {
    self.pause().await;
    self.inner.assign_reviewers(id, reviewers).await.map_err(never)
  }

  async fn list_reviewers(&self, id: &PullRequestId) -> Result<Vec<UserId>, Injected> {
    self.pause().await;
    self.inner.list_reviewers(id).await.map_err(never)
  }

  async fn reassign_reviewer(
    &self,
    id: &PullRequestId,
    old: &UserId,
    new: &UserId,
  ) -> Result<SlotWrite, Injected> {
    self.pause().await;
    self.inner.reassign_reviewer(id, old, new).await.map_err(never)
  }

  async fn move_reviewer(
    &self,
    id: &PullRequestId,
    old: &UserId,
    reviewer: &UserId,
  ) -> Result<SlotWrite, Injected> {
    self.pause().await;
    self.inner.move_reviewer(id, old, reviewer).await.map_err(never)
  }

  async fn remove_reviewer(
    &self,
    id: &PullRequestId,
    reviewer: &UserId,
  ) -> Result<(), Injected> {
    self.pause().await;
    self.inner.remove_reviewer(id, reviewer).await.map_err(never)
  }

  async fn merge_pull_request(
    &self,
    id: &PullRequestId,
    at: DateTime<Utc>,
  ) -> Result<bool, Injected> {
    self.pause().await;
    self.inner.merge_pull_request(id, at).await.map_err(never)
  }

  async fn list_by_reviewer(
    &self,
    reviewer: &UserId,
  ) -> Result<Vec<PullRequest>, Injected> {
    self.pause().await;
    self.inner.list_by_reviewer(reviewer).await.map_err(never)
  }
}

#[tokio::test]
async fn failing_member_upsert_aborts_and_keeps_earlier_members() {
  let store = Arc::new(Wrapped {
    fail_on: Some("u2".into()),
    ..Wrapped::default()
  });
  let directory = Directory::new(store.clone());

  let err = directory
    .create_team(team("backend", &[("u1", true), ("u2", true), ("u3", true)]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Store(_)));
  assert_eq!(err.kind(), ErrorKind::Internal);

  assert!(store.get_user(&"u1".into()).await.unwrap().is_some());
  assert!(store.get_user(&"u3".into()).await.unwrap().is_none());
}

// ─── Interleaved operations ──────────────────────────────────────────────────

async fn interleaved(members: &[&str]) -> (Arc<Wrapped>, Lifecycle<Wrapped>) {
  let store = Arc::new(Wrapped { interleave: true, ..Wrapped::default() });
  let roster: Vec<(&str, bool)> = members.iter().map(|m| (*m, true)).collect();
  Directory::new(store.clone())
    .create_team(team("backend", &roster))
    .await
    .unwrap();
  let lifecycle = Lifecycle::new(store.clone());
  lifecycle
    .create(NewPullRequest::new("pr-1", "x", "author"))
    .await
    .unwrap();
  (store, lifecycle)
}

#[tokio::test]
async fn concurrent_reassignments_never_duplicate_a_reviewer() {
  let (store, lifecycle) = interleaved(&["author", "u1", "u2", "u3"]).await;
  let id = PullRequestId::from("pr-1");

  let (u1, u2) = (UserId::from("u1"), UserId::from("u2"));
  let (a, b) = tokio::join!(
    lifecycle.reassign(&id, &u1),
    lifecycle.reassign(&id, &u2),
  );
  assert!(a.is_ok() || b.is_ok(), "{a:?} {b:?}");
  for err in [a, b].into_iter().filter_map(Result::err) {
    assert_eq!(err.kind(), ErrorKind::Conflict, "{err:?}");
  }

  let pr = store.get_pull_request(&id).await.unwrap().unwrap();
  assert_no_duplicates(&pr);
  assert!(!pr.assigned_reviewers.contains(&"author".into()));
}

#[tokio::test]
async fn reassign_racing_merge_leaves_merged_reviewers_frozen() {
  let (store, lifecycle) = interleaved(&["author", "u1", "u2", "u3"]).await;
  let id = PullRequestId::from("pr-1");

  let u1 = UserId::from("u1");
  let (reassigned, merged) = tokio::join!(
    lifecycle.reassign(&id, &u1),
    lifecycle.merge(&id),
  );
  let merged = merged.unwrap();
  if let Err(err) = &reassigned {
    assert!(matches!(err, Error::AlreadyMerged(_)), "{err:?}");
  }

  let after = store.get_pull_request(&id).await.unwrap().unwrap();
  assert_eq!(after.status, PullRequestStatus::Merged);
  assert_eq!(after.assigned_reviewers, merged.assigned_reviewers);
  assert_no_duplicates(&after);
}
