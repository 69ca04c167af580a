//! Domain types: users, teams and pull requests.
//!
//! Identifiers are opaque strings chosen by the caller (e.g. `"u1"`,
//! `"pr-1001"`); the service never mints them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Identity of a user.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Globally unique identity of a pull request.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PullRequestId(pub String);

macro_rules! string_id {
  ($ty:ident) => {
    impl $ty {
      pub fn as_str(&self) -> &str { &self.0 }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl From<&str> for $ty {
      fn from(s: &str) -> Self { Self(s.to_owned()) }
    }

    impl From<String> for $ty {
      fn from(s: String) -> Self { Self(s) }
    }
  };
}

string_id!(UserId);
string_id!(PullRequestId);

// ─── Users and teams ─────────────────────────────────────────────────────────

/// A user as stored by the directory. Every user belongs to exactly one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:   UserId,
  pub username:  String,
  pub team_name: String,
  pub is_active: bool,
}

/// A team member as listed inside a [`Team`]; the team name is implied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
  pub user_id:   UserId,
  pub username:  String,
  pub is_active: bool,
}

/// A named team with its members in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub team_name: String,
  pub members:   Vec<TeamMember>,
}

impl Team {
  /// The members as [`User`] records scoped to this team.
  pub fn users(&self) -> impl Iterator<Item = User> + '_ {
    self.members.iter().map(|m| User {
      user_id:   m.user_id.clone(),
      username:  m.username.clone(),
      team_name: self.team_name.clone(),
      is_active: m.is_active,
    })
  }
}

impl From<User> for TeamMember {
  fn from(u: User) -> Self {
    Self { user_id: u.user_id, username: u.username, is_active: u.is_active }
  }
}

// ─── Pull requests ───────────────────────────────────────────────────────────

/// Pull request status. The only transition is `Open → Merged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
  Open,
  Merged,
}

impl PullRequestStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "OPEN",
      Self::Merged => "MERGED",
    }
  }
}

/// A tracked pull request.
///
/// `merged_at` is `Some` exactly when `status` is
/// [`PullRequestStatus::Merged`], and never changes once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
  pub pull_request_id:    PullRequestId,
  pub pull_request_name:  String,
  pub author_id:          UserId,
  pub status:             PullRequestStatus,
  /// At most two ids, never the author, never repeated. Insertion order.
  pub assigned_reviewers: Vec<UserId>,
  pub created_at:         DateTime<Utc>,
  pub merged_at:          Option<DateTime<Utc>>,
}

impl PullRequest {
  pub fn is_merged(&self) -> bool {
    self.status == PullRequestStatus::Merged
  }
}

/// Input to [`crate::Lifecycle::create`].
#[derive(Debug, Clone)]
pub struct NewPullRequest {
  pub pull_request_id:   PullRequestId,
  pub pull_request_name: String,
  pub author_id:         UserId,
  /// Defaults to the current UTC time when `None`.
  pub created_at:        Option<DateTime<Utc>>,
}

impl NewPullRequest {
  pub fn new(
    id: impl Into<PullRequestId>,
    name: impl Into<String>,
    author: impl Into<UserId>,
  ) -> Self {
    Self {
      pull_request_id:   id.into(),
      pull_request_name: name.into(),
      author_id:         author.into(),
      created_at:        None,
    }
  }
}
