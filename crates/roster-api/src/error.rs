//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the shape `{"error": {"code": "...", "message": "..."}}`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::{Error as CoreError, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl ApiError {
  /// Status code and machine-readable error code.
  fn classify(&self) -> (StatusCode, &'static str) {
    let core = match self {
      Self::BadRequest(_) => return (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
      Self::Core(e) => e,
    };
    match (core.kind(), core) {
      (ErrorKind::AlreadyExists, CoreError::TeamExists(_)) => {
        (StatusCode::BAD_REQUEST, "TEAM_EXISTS")
      }
      (ErrorKind::AlreadyExists, _) => (StatusCode::CONFLICT, "PR_EXISTS"),
      (ErrorKind::NotFound, _) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
      (ErrorKind::AlreadyMerged, _) => (StatusCode::CONFLICT, "PR_MERGED"),
      (ErrorKind::NotAssigned, _) => (StatusCode::BAD_REQUEST, "NOT_ASSIGNED"),
      (ErrorKind::NoCandidate, _) => (StatusCode::BAD_REQUEST, "NO_CANDIDATE"),
      (ErrorKind::Conflict, _) => (StatusCode::CONFLICT, "REASSIGN_CONFLICT"),
      (ErrorKind::Internal, _) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code) = self.classify();
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!(error = %self, "request failed");
      "internal error".to_owned()
    } else {
      self.to_string()
    };
    (status, Json(json!({ "error": { "code": code, "message": message } })))
      .into_response()
  }
}
