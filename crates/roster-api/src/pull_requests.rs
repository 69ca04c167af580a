//! Handlers for `/pullRequest/*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/pullRequest/create` | Body: [`CreateBody`]; returns 201 + `{"pr": ...}` |
//! | `POST` | `/pullRequest/reassign` | Body: [`ReassignBody`]; returns `{"pr": ..., "replaced_by": ...}` |
//! | `POST` | `/pullRequest/merge` | Body: [`MergeBody`]; idempotent |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use roster_core::{
  Reassignment,
  model::{NewPullRequest, PullRequestId, UserId},
  store::RosterStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError, require};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /pullRequest/create`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub pull_request_id:   PullRequestId,
  pub pull_request_name: String,
  pub author_id:         UserId,
  /// Server time is used when omitted.
  #[serde(default)]
  pub created_at:        Option<DateTime<Utc>>,
}

impl From<CreateBody> for NewPullRequest {
  fn from(b: CreateBody) -> Self {
    NewPullRequest {
      pull_request_id:   b.pull_request_id,
      pull_request_name: b.pull_request_name,
      author_id:         b.author_id,
      created_at:        b.created_at,
    }
  }
}

/// `POST /pullRequest/create`: returns 201 + the stored pull request,
/// reviewers included.
pub async fn create<S: RosterStore>(
  State(state): State<AppState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  require("pull_request_id", body.pull_request_id.as_str())?;
  require("pull_request_name", &body.pull_request_name)?;
  require("author_id", body.author_id.as_str())?;

  let pr = state.lifecycle.create(body.into()).await?;
  Ok((StatusCode::CREATED, Json(json!({ "pr": pr }))))
}

// ─── Reassign ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReassignBody {
  pub pull_request_id: PullRequestId,
  pub old_user_id:     UserId,
}

/// `POST /pullRequest/reassign`
pub async fn reassign<S: RosterStore>(
  State(state): State<AppState<S>>,
  body: Result<Json<ReassignBody>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiError> {
  let Json(body) = body?;
  require("pull_request_id", body.pull_request_id.as_str())?;
  require("old_user_id", body.old_user_id.as_str())?;

  let out = state
    .lifecycle
    .reassign(&body.pull_request_id, &body.old_user_id)
    .await?;
  Ok(Json(out))
}

// ─── Merge ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MergeBody {
  pub pull_request_id: PullRequestId,
}

/// `POST /pullRequest/merge`. Merging twice returns the same record.
pub async fn merge<S: RosterStore>(
  State(state): State<AppState<S>>,
  body: Result<Json<MergeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  require("pull_request_id", body.pull_request_id.as_str())?;

  let pr = state.lifecycle.merge(&body.pull_request_id).await?;
  Ok(Json(json!({ "pr": pr })))
}
