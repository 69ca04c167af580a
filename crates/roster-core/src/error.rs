//! Error types for `roster-core`.

use thiserror::Error;

use crate::model::{PullRequestId, UserId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("team {0:?} already exists")]
  TeamExists(String),

  #[error("pull request {0} already exists")]
  PullRequestExists(PullRequestId),

  #[error("team not found: {0:?}")]
  TeamNotFound(String),

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("pull request not found: {0}")]
  PullRequestNotFound(PullRequestId),

  #[error("pull request {0} is already merged")]
  AlreadyMerged(PullRequestId),

  #[error("user {reviewer} is not assigned to pull request {pull_request}")]
  NotAssigned {
    pull_request: PullRequestId,
    reviewer:     UserId,
  },

  #[error("no active replacement candidate for {reviewer} on pull request {pull_request}")]
  NoCandidate {
    pull_request: PullRequestId,
    reviewer:     UserId,
  },

  #[error("reviewer {reviewer} was assigned to pull request {pull_request} concurrently")]
  ReviewerTaken {
    pull_request: PullRequestId,
    reviewer:     UserId,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of an [`Error`], used by transports to pick a
/// status code without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  AlreadyExists,
  NotFound,
  AlreadyMerged,
  NotAssigned,
  NoCandidate,
  /// A concurrent write claimed the chosen reviewer first.
  Conflict,
  Internal,
}

impl Error {
  /// Wrap a backend failure. Store errors are never interpreted here.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::TeamExists(_) | Self::PullRequestExists(_) => ErrorKind::AlreadyExists,
      Self::TeamNotFound(_)
      | Self::UserNotFound(_)
      | Self::PullRequestNotFound(_) => ErrorKind::NotFound,
      Self::AlreadyMerged(_) => ErrorKind::AlreadyMerged,
      Self::NotAssigned { .. } => ErrorKind::NotAssigned,
      Self::NoCandidate { .. } => ErrorKind::NoCandidate,
      Self::ReviewerTaken { .. } => ErrorKind::Conflict,
      Self::Store(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
