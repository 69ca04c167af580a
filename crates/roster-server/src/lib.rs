//! Process wiring for the roster service: configuration and the top-level
//! router with request tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use config::{Config, ConfigError, Environment, File, FileFormat};
use roster_core::store::RosterStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Prefix for environment overrides, e.g. `ROSTER_PORT=9000`.
pub const ENV_PREFIX: &str = "ROSTER";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which storage backend the server runs against.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  #[default]
  Sqlite,
  /// Process-local, lost on exit.
  Memory,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables. Every field has a default.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store:      StoreBackend,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "0.0.0.0".to_string(),
      port:       8080,
      store:      StoreBackend::Sqlite,
      store_path: PathBuf::from("roster.db"),
    }
  }
}

impl ServerConfig {
  /// Load from an optional TOML file, then apply environment overrides.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  /// Parse an in-memory TOML document, without environment overrides.
  pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with an HTTP trace layer on top.
pub fn app<S: RosterStore>(store: Arc<S>) -> Router {
  roster_api::api_router(store).layer(TraceLayer::new_for_http())
}
