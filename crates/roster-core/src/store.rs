//! Storage ports consumed by the lifecycle and directory services.
//!
//! Each entity gets its own capability trait so a backend (or a test fake)
//! can be written and reasoned about one table at a time. All three share the
//! backend's transient error type through [`Store`].
//!
//! Domain-level signals are carried in return values rather than errors:
//! a missing row is `None`, a conflicting or unmatched conditional write is
//! `false`. `Self::Error` is reserved for failures the core does not
//! interpret (connectivity, corruption) and propagates unchanged.
//!
//! Implementations must make every single method call atomic. The services
//! issue their calls as if serialized per pull request and do no locking of
//! their own.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::model::{PullRequest, PullRequestId, Team, User, UserId};

/// Common supertrait for every storage port.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Teams ───────────────────────────────────────────────────────────────────

pub trait TeamStore: Store {
  /// Create an empty team. Returns `false` if the name is already taken.
  fn create_team<'a>(
    &'a self,
    team_name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Fetch a team together with all of its members (active or not), in
  /// roster order.
  fn get_team<'a>(
    &'a self,
    team_name: &'a str,
  ) -> impl Future<Output = Result<Option<Team>, Self::Error>> + Send + 'a;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserStore: Store {
  /// Create the user, or overwrite name, team and activity if it exists.
  /// An existing user keeps its roster position.
  fn upsert_user(
    &self,
    user: User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_user<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Active members of `team_name` in stable roster order. This order is the
  /// tie-break for every reviewer selection.
  fn list_active_by_team<'a>(
    &'a self,
    team_name: &'a str,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  /// Flip the activity flag. Returns the updated user, or `None` if unknown.
  fn set_user_active<'a>(
    &'a self,
    user_id: &'a UserId,
    is_active: bool,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;
}

// ─── Pull requests ───────────────────────────────────────────────────────────

/// Outcome of a conditional reviewer-slot write. Checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWrite {
  /// The slot now holds the incoming reviewer.
  Written,
  /// The pull request is merged; its reviewers are frozen.
  Merged,
  /// `old` holds no slot, or the pull request does not exist.
  NotAssigned,
  /// The incoming reviewer already holds another slot.
  Occupied,
}

pub trait PullRequestStore: Store {
  /// Insert a pull request (its reviewer list is ignored). Returns `false`
  /// if the id is already taken.
  fn create_pull_request<'a>(
    &'a self,
    pr: &'a PullRequest,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Fetch a pull request with its reviewers in slot order.
  fn get_pull_request<'a>(
    &'a self,
    id: &'a PullRequestId,
  ) -> impl Future<Output = Result<Option<PullRequest>, Self::Error>> + Send + 'a;

  /// Append reviewers in the given order; ids already attached are skipped.
  /// No-op once the pull request is merged.
  fn assign_reviewers<'a>(
    &'a self,
    id: &'a PullRequestId,
    reviewers: &'a [UserId],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn list_reviewers<'a>(
    &'a self,
    id: &'a PullRequestId,
  ) -> impl Future<Output = Result<Vec<UserId>, Self::Error>> + Send + 'a;

  /// Replace `old` with `new` in the same slot. Refused with
  /// [`SlotWrite::Occupied`] if `new` already holds another slot.
  fn reassign_reviewer<'a>(
    &'a self,
    id: &'a PullRequestId,
    old: &'a UserId,
    new: &'a UserId,
  ) -> impl Future<Output = Result<SlotWrite, Self::Error>> + Send + 'a;

  /// Move `reviewer` into `old`'s slot, vacating the slot `reviewer` held
  /// before. One atomic write; never answers [`SlotWrite::Occupied`].
  fn move_reviewer<'a>(
    &'a self,
    id: &'a PullRequestId,
    old: &'a UserId,
    reviewer: &'a UserId,
  ) -> impl Future<Output = Result<SlotWrite, Self::Error>> + Send + 'a;

  /// Detach a reviewer. No-op if it is not assigned or the pull request is
  /// merged.
  fn remove_reviewer<'a>(
    &'a self,
    id: &'a PullRequestId,
    reviewer: &'a UserId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Mark the pull request merged, setting `merged_at` to `at` only if it is
  /// still unset. Returns `false` if the pull request does not exist.
  fn merge_pull_request<'a>(
    &'a self,
    id: &'a PullRequestId,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every pull request currently listing `reviewer`.
  fn list_by_reviewer<'a>(
    &'a self,
    reviewer: &'a UserId,
  ) -> impl Future<Output = Result<Vec<PullRequest>, Self::Error>> + Send + 'a;
}

// ─── Combined bound ──────────────────────────────────────────────────────────

/// Every port at once; what the HTTP layer and the server binary require.
pub trait RosterStore: TeamStore + UserStore + PullRequestStore + 'static {}

impl<T> RosterStore for T where T: TeamStore + UserStore + PullRequestStore + 'static {}
