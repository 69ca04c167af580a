//! Handlers for `/team/*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/team/add` | Body: [`Team`]; returns 201 + `{"team": ...}` |
//! | `GET`  | `/team/info` | `?team_name=` required; 404 if unknown |
//! | `GET`  | `/team/get` | Alias of `/team/info` |

use axum::{
  Json,
  extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{model::Team, store::RosterStore};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError, require};

/// `POST /team/add`: create a team and upsert its members.
pub async fn add<S: RosterStore>(
  State(state): State<AppState<S>>,
  body: Result<Json<Team>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(team) = body?;
  require("team_name", &team.team_name)?;
  for m in &team.members {
    require("user_id", m.user_id.as_str())?;
  }

  let team = state.directory.create_team(team).await?;
  Ok((StatusCode::CREATED, Json(json!({ "team": team }))))
}

#[derive(Debug, Deserialize)]
pub struct GetParams {
  pub team_name: String,
}

/// `GET /team/info?team_name=<name>`
pub async fn get_one<S: RosterStore>(
  State(state): State<AppState<S>>,
  params: Result<Query<GetParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Query(params) = params?;
  require("team_name", &params.team_name)?;

  let team = state.directory.get_team(&params.team_name).await?;
  Ok(Json(json!({ "team": team })))
}
