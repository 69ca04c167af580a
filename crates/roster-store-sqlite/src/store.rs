//! [`SqliteStore`]: the SQLite implementation of the roster store ports.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use roster_core::{
  model::{PullRequest, PullRequestId, Team, User, UserId},
  store::{PullRequestStore, SlotWrite, Store, TeamStore, UserStore},
};

use crate::{
  Error, Result,
  encode::{
    PULL_REQUEST_COLUMNS, RawPullRequest, RawUser, USER_COLUMNS, encode_dt,
    encode_status,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    debug!(?path, "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Reviewer ids of one pull request in slot order.
fn load_reviewers(
  conn: &rusqlite::Connection,
  pull_request_id: &str,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare_cached(
    "SELECT reviewer_id FROM pull_request_reviewers
     WHERE pull_request_id = ?1
     ORDER BY slot",
  )?;
  let ids = stmt
    .query_map(rusqlite::params![pull_request_id], |row| row.get(0))?
    .collect();
  ids
}

fn holds_slot(
  conn: &rusqlite::Connection,
  pull_request_id: &str,
  reviewer_id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM pull_request_reviewers
         WHERE pull_request_id = ?1 AND reviewer_id = ?2",
        rusqlite::params![pull_request_id, reviewer_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// Put `new` into `old`'s slot inside one transaction. With `vacate`, a slot
/// already held by `new` is deleted first; without it the write is refused.
fn write_slot(
  conn: &mut rusqlite::Connection,
  pull_request_id: &str,
  old: &str,
  new: &str,
  vacate: bool,
) -> rusqlite::Result<SlotWrite> {
  let tx = conn.transaction()?;

  let open: Option<bool> = tx
    .query_row(
      "SELECT status = 'OPEN' FROM pull_requests WHERE pull_request_id = ?1",
      rusqlite::params![pull_request_id],
      |row| row.get(0),
    )
    .optional()?;
  let outcome = match open {
    None => SlotWrite::NotAssigned,
    Some(false) => SlotWrite::Merged,
    Some(true) if !holds_slot(&tx, pull_request_id, old)? => SlotWrite::NotAssigned,
    Some(true) => {
      let held = new != old && holds_slot(&tx, pull_request_id, new)?;
      if held && !vacate {
        SlotWrite::Occupied
      } else {
        if held {
          tx.execute(
            "DELETE FROM pull_request_reviewers
             WHERE pull_request_id = ?1 AND reviewer_id = ?2",
            rusqlite::params![pull_request_id, new],
          )?;
        }
        tx.execute(
          "UPDATE pull_request_reviewers SET reviewer_id = ?3
           WHERE pull_request_id = ?1 AND reviewer_id = ?2",
          rusqlite::params![pull_request_id, old, new],
        )?;
        SlotWrite::Written
      }
    }
  };

  tx.commit()?;
  Ok(outcome)
}

// ─── Port impls ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;
}

impl TeamStore for SqliteStore {
  async fn create_team(&self, team_name: &str) -> Result<bool> {
    let name = team_name.to_owned();

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO teams (team_name) VALUES (?1) ON CONFLICT DO NOTHING",
          rusqlite::params![name],
        )?)
      })
      .await?;

    Ok(inserted == 1)
  }

  async fn get_team(&self, team_name: &str) -> Result<Option<Team>> {
    let name = team_name.to_owned();

    let raws: Option<Vec<RawUser>> = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM teams WHERE team_name = ?1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users WHERE team_name = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![name], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    Ok(raws.map(|raws| Team {
      team_name: team_name.to_owned(),
      members:   raws.into_iter().map(|r| r.into_user().into()).collect(),
    }))
  }
}

impl UserStore for SqliteStore {
  async fn upsert_user(&self, user: User) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, team_name, is_active)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (user_id) DO UPDATE SET
             username  = excluded.username,
             team_name = excluded.team_name,
             is_active = excluded.is_active",
          rusqlite::params![
            user.user_id.0,
            user.username,
            user.team_name,
            user.is_active,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
    let id = user_id.0.clone();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawUser::into_user))
  }

  async fn list_active_by_team(&self, team_name: &str) -> Result<Vec<User>> {
    let name = team_name.to_owned();

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users
           WHERE team_name = ?1 AND is_active = 1
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![name], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawUser::into_user).collect())
  }

  async fn set_user_active(
    &self,
    user_id: &UserId,
    is_active: bool,
  ) -> Result<Option<User>> {
    let id = user_id.0.clone();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE users SET is_active = ?2 WHERE user_id = ?1
                 RETURNING {USER_COLUMNS}"
              ),
              rusqlite::params![id, is_active],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawUser::into_user))
  }
}

impl PullRequestStore for SqliteStore {
  async fn create_pull_request(&self, pr: &PullRequest) -> Result<bool> {
    let id         = pr.pull_request_id.as_str().to_owned();
    let name       = pr.pull_request_name.clone();
    let author     = pr.author_id.0.clone();
    let status     = encode_status(pr.status);
    let created_at = encode_dt(pr.created_at);
    let merged_at  = pr.merged_at.map(encode_dt);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO pull_requests (
             pull_request_id, pull_request_name, author_id,
             status, created_at, merged_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT DO NOTHING",
          rusqlite::params![id, name, author, status, created_at, merged_at],
        )?)
      })
      .await?;

    Ok(inserted == 1)
  }

  async fn get_pull_request(&self, id: &PullRequestId) -> Result<Option<PullRequest>> {
    let id = id.as_str().to_owned();

    let raw: Option<RawPullRequest> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "SELECT {PULL_REQUEST_COLUMNS} FROM pull_requests
               WHERE pull_request_id = ?1"
            ),
            rusqlite::params![id],
            RawPullRequest::from_row,
          )
          .optional()?;
        let Some(mut raw) = raw else {
          return Ok(None);
        };
        raw.reviewers = load_reviewers(conn, &raw.pull_request_id)?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawPullRequest::into_pull_request).transpose()
  }

  async fn assign_reviewers(
    &self,
    id: &PullRequestId,
    reviewers: &[UserId],
  ) -> Result<()> {
    let id = id.as_str().to_owned();
    let reviewers: Vec<String> = reviewers.iter().map(|r| r.0.clone()).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id)
             SELECT ?1, ?2 WHERE EXISTS (
               SELECT 1 FROM pull_requests
               WHERE pull_request_id = ?1 AND status = 'OPEN'
             )
             ON CONFLICT DO NOTHING",
          )?;
          for reviewer in &reviewers {
            stmt.execute(rusqlite::params![id, reviewer])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_reviewers(&self, id: &PullRequestId) -> Result<Vec<UserId>> {
    let id = id.as_str().to_owned();

    let ids: Vec<String> = self
      .conn
      .call(move |conn| Ok(load_reviewers(conn, &id)?))
      .await?;

    Ok(ids.into_iter().map(UserId).collect())
  }

  async fn reassign_reviewer(
    &self,
    id: &PullRequestId,
    old: &UserId,
    new: &UserId,
  ) -> Result<SlotWrite> {
    let id  = id.as_str().to_owned();
    let old = old.0.clone();
    let new = new.0.clone();

    let write = self
      .conn
      .call(move |conn| Ok(write_slot(conn, &id, &old, &new, false)?))
      .await?;
    Ok(write)
  }

  async fn move_reviewer(
    &self,
    id: &PullRequestId,
    old: &UserId,
    reviewer: &UserId,
  ) -> Result<SlotWrite> {
    let id       = id.as_str().to_owned();
    let old      = old.0.clone();
    let reviewer = reviewer.0.clone();

    let write = self
      .conn
      .call(move |conn| Ok(write_slot(conn, &id, &old, &reviewer, true)?))
      .await?;
    Ok(write)
  }

  async fn remove_reviewer(&self, id: &PullRequestId, reviewer: &UserId) -> Result<()> {
    let id       = id.as_str().to_owned();
    let reviewer = reviewer.0.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM pull_request_reviewers
           WHERE pull_request_id = ?1 AND reviewer_id = ?2
             AND EXISTS (
               SELECT 1 FROM pull_requests
               WHERE pull_request_id = ?1 AND status = 'OPEN'
             )",
          rusqlite::params![id, reviewer],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn merge_pull_request(
    &self,
    id: &PullRequestId,
    at: DateTime<Utc>,
  ) -> Result<bool> {
    let id = id.as_str().to_owned();
    let at = encode_dt(at);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE pull_requests
           SET status    = 'MERGED',
               merged_at = COALESCE(merged_at, ?2)
           WHERE pull_request_id = ?1",
          rusqlite::params![id, at],
        )?)
      })
      .await?;

    Ok(updated == 1)
  }

  async fn list_by_reviewer(&self, reviewer: &UserId) -> Result<Vec<PullRequest>> {
    let reviewer = reviewer.0.clone();

    let raws: Vec<RawPullRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PULL_REQUEST_COLUMNS} FROM pull_requests
           WHERE pull_request_id IN (
             SELECT pull_request_id FROM pull_request_reviewers
             WHERE reviewer_id = ?1
           )
           ORDER BY rowid"
        ))?;
        let mut rows = stmt
          .query_map(rusqlite::params![reviewer], RawPullRequest::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        for raw in &mut rows {
          raw.reviewers = load_reviewers(conn, &raw.pull_request_id)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPullRequest::into_pull_request).collect()
  }
}
