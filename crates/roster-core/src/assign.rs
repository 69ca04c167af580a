//! Reviewer selection.
//!
//! Pure functions over a candidate pool: the active members of a team in
//! roster order. No I/O and no randomness; pool order is the only tie-break,
//! so identical inputs always produce identical output.

use std::collections::HashSet;

use crate::model::{User, UserId};

/// Upper bound on reviewers attached to a single pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Outcome of [`select_replacement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
  /// A teammate not yet reviewing this pull request.
  Fresh(UserId),
  /// A teammate already holding another slot on this pull request. It has
  /// to leave that slot as it moves into the freed one, otherwise the pull
  /// request would list the same reviewer twice.
  Reused(UserId),
}

impl Replacement {
  pub fn into_user_id(self) -> UserId {
    match self {
      Self::Fresh(id) | Self::Reused(id) => id,
    }
  }
}

/// Pick up to [`MAX_REVIEWERS`] reviewers for a new pull request, in pool
/// order, skipping the author.
///
/// An empty result is not an error here; the caller decides what "nobody
/// available" means.
pub fn select_initial_reviewers(author: &UserId, pool: &[User]) -> Vec<UserId> {
  pool
    .iter()
    .filter(|u| u.is_active && &u.user_id != author)
    .take(MAX_REVIEWERS)
    .map(|u| u.user_id.clone())
    .collect()
}

/// Pick a teammate to take over `old`'s slot.
///
/// The first pass looks for someone who is neither the author, `old`, nor
/// already assigned. Only if that finds nobody does a second pass fall back to
/// an already-assigned reviewer, returned as [`Replacement::Reused`].
pub fn select_replacement(
  author: &UserId,
  old: &UserId,
  assigned: &HashSet<UserId>,
  pool: &[User],
) -> Option<Replacement> {
  let mut eligible = pool
    .iter()
    .filter(|u| u.is_active && &u.user_id != author && &u.user_id != old)
    .map(|u| &u.user_id);

  if let Some(id) = eligible.clone().find(|id| !assigned.contains(*id)) {
    return Some(Replacement::Fresh(id.clone()));
  }

  eligible
    .find(|id| assigned.contains(*id))
    .map(|id| Replacement::Reused(id.clone()))
}
