//! JSON HTTP API for the roster service.
//!
//! Exposes an axum [`Router`] backed by any [`RosterStore`]. Handlers only
//! translate between JSON and the core services; every decision is made in
//! `roster-core`. TLS, auth and tracing layers are the caller's business.
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::serve(listener, roster_api::api_router(Arc::new(store)))
//! ```

pub mod error;
pub mod pull_requests;
pub mod teams;
pub mod users;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use roster_core::{Directory, Lifecycle, store::RosterStore};
use serde_json::{Value, json};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers: the two core services over
/// one store.
pub struct AppState<S> {
  pub lifecycle: Lifecycle<S>,
  pub directory: Directory<S>,
}

impl<S: RosterStore> AppState<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      lifecycle: Lifecycle::new(store.clone()),
      directory: Directory::new(store),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      lifecycle: self.lifecycle.clone(),
      directory: self.directory.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S: RosterStore>(store: Arc<S>) -> Router<()> {
  Router::new()
    .route("/health", get(health))
    // Teams
    .route("/team/add", post(teams::add::<S>))
    .route("/team/info", get(teams::get_one::<S>))
    .route("/team/get", get(teams::get_one::<S>))
    // Users
    .route("/users/setIsActive", post(users::set_is_active::<S>))
    .route("/users/getReview", get(users::get_review::<S>))
    // Pull requests
    .route("/pullRequest/create", post(pull_requests::create::<S>))
    .route("/pullRequest/reassign", post(pull_requests::reassign::<S>))
    .route("/pullRequest/merge", post(pull_requests::merge::<S>))
    .with_state(AppState::new(store))
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// Reject an empty required string field.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(ApiError::BadRequest(format!("{field} is required")));
  }
  Ok(())
}
