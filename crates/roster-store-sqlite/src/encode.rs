//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, status as its upper-case name,
//! booleans as 0/1 integers.

use chrono::{DateTime, Utc};
use roster_core::model::{PullRequest, PullRequestStatus, User, UserId};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PullRequestStatus ───────────────────────────────────────────────────────

pub fn encode_status(s: PullRequestStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<PullRequestStatus> {
  match s {
    "OPEN" => Ok(PullRequestStatus::Open),
    "MERGED" => Ok(PullRequestStatus::Merged),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_id, username, team_name, is_active";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:   String,
  pub username:  String,
  pub team_name: String,
  pub is_active: bool,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:   row.get(0)?,
      username:  row.get(1)?,
      team_name: row.get(2)?,
      is_active: row.get(3)?,
    })
  }

  pub fn into_user(self) -> User {
    User {
      user_id:   UserId(self.user_id),
      username:  self.username,
      team_name: self.team_name,
      is_active: self.is_active,
    }
  }
}

pub const PULL_REQUEST_COLUMNS: &str =
  "pull_request_id, pull_request_name, author_id, status, created_at, merged_at";

/// Raw strings read from a `pull_requests` row plus its reviewer ids in slot
/// order.
pub struct RawPullRequest {
  pub pull_request_id:   String,
  pub pull_request_name: String,
  pub author_id:         String,
  pub status:            String,
  pub created_at:        String,
  pub merged_at:         Option<String>,
  pub reviewers:         Vec<String>,
}

impl RawPullRequest {
  /// Reads the `pull_requests` columns; `reviewers` is filled in separately.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pull_request_id:   row.get(0)?,
      pull_request_name: row.get(1)?,
      author_id:         row.get(2)?,
      status:            row.get(3)?,
      created_at:        row.get(4)?,
      merged_at:         row.get(5)?,
      reviewers:         Vec::new(),
    })
  }

  pub fn into_pull_request(self) -> Result<PullRequest> {
    Ok(PullRequest {
      pull_request_id:    self.pull_request_id.into(),
      pull_request_name:  self.pull_request_name,
      author_id:          UserId(self.author_id),
      status:             decode_status(&self.status)?,
      assigned_reviewers: self.reviewers.into_iter().map(UserId).collect(),
      created_at:         decode_dt(&self.created_at)?,
      merged_at:          self.merged_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
