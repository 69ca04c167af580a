//! Handlers for `/users/*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/setIsActive` | Body: `{"user_id":"u1","is_active":false}` |
//! | `GET`  | `/users/getReview` | `?user_id=` required; pull requests reviewed by the user |

use axum::{
  Json,
  extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
  response::IntoResponse,
};
use roster_core::{
  model::{PullRequest, PullRequestId, PullRequestStatus, UserId},
  store::RosterStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, error::ApiError, require};

// ─── Activity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetActiveBody {
  pub user_id:   UserId,
  pub is_active: bool,
}

/// `POST /users/setIsActive`
pub async fn set_is_active<S: RosterStore>(
  State(state): State<AppState<S>>,
  body: Result<Json<SetActiveBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  require("user_id", body.user_id.as_str())?;

  let user = state
    .directory
    .set_user_active(&body.user_id, body.is_active)
    .await?;
  Ok(Json(json!({ "user": user })))
}

// ─── Review queue ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReviewParams {
  pub user_id: UserId,
}

/// Listing form of a pull request; reviewers and timestamps are omitted.
#[derive(Debug, Serialize)]
pub struct PullRequestShort {
  pub pull_request_id:   PullRequestId,
  pub pull_request_name: String,
  pub author_id:         UserId,
  pub status:            PullRequestStatus,
}

impl From<PullRequest> for PullRequestShort {
  fn from(pr: PullRequest) -> Self {
    Self {
      pull_request_id:   pr.pull_request_id,
      pull_request_name: pr.pull_request_name,
      author_id:         pr.author_id,
      status:            pr.status,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
  pub user_id:       UserId,
  pub pull_requests: Vec<PullRequestShort>,
}

/// `GET /users/getReview?user_id=<id>`
pub async fn get_review<S: RosterStore>(
  State(state): State<AppState<S>>,
  params: Result<Query<ReviewParams>, QueryRejection>,
) -> Result<Json<ReviewResponse>, ApiError> {
  let Query(params) = params?;
  require("user_id", params.user_id.as_str())?;

  let prs = state
    .directory
    .list_pull_requests_for_reviewer(&params.user_id)
    .await?;
  Ok(Json(ReviewResponse {
    user_id:       params.user_id,
    pull_requests: prs.into_iter().map(Into::into).collect(),
  }))
}
