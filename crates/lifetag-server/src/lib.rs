//! HTTP layer for lifetag.
//!
//! Exposes an axum [`Router`] over any [`RecordStore`]: a public surface for
//! submitting and resolving emergency records, and a credentialed surface
//! for administration. TLS and reverse-proxy concerns stay outside.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod upload;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  http::{HeaderValue, Method, header},
  routing::{delete, get, post},
};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

use lifetag_core::store::RecordStore;

use handlers::{admin, records};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_max_upload_bytes() -> usize { 50 * 1024 * 1024 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `LIFETAG_*` environment variables.
#[derive(serde::Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Public origin baked into QR payloads, e.g. `https://lifetag.example`.
  pub base_url:   String,
  pub store_path: PathBuf,
  pub upload_dir: PathBuf,
  /// Privileged-setup key gating first-admin creation; empty disables it.
  #[serde(default)]
  pub setup_key:  String,
  /// Origins allowed by CORS; empty means same-origin only.
  #[serde(default)]
  pub allowed_origins: Vec<String>,
  /// When set, submissions must carry a valid email as well as a phone.
  #[serde(default)]
  pub require_email: bool,
  /// Upper bound on a submission body, photo included.
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let cors = cors_layer(&state.config);
  let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

  Router::new()
    .route("/", get(health))
    // Records
    .route(
      "/api/emergency",
      post(records::submit::<S>)
        .put(records::update::<S>)
        .get(admin::list_records::<S>)
        .delete(admin::clear_records::<S>),
    )
    .route("/api/emergency/email/{email}", get(records::by_email::<S>))
    .route("/api/emergency/phone/{phone}", get(records::by_phone::<S>))
    // Administration
    .route("/api/admin/setup", post(admin::setup::<S>))
    .route("/api/admin/users", get(admin::list_users::<S>))
    .route("/api/admin/users/manager", post(admin::create_manager::<S>))
    .route("/api/admin/users/{id}", delete(admin::delete_user::<S>))
    .route("/api/admin/password", post(admin::change_password::<S>))
    .layer(body_limit)
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> &'static str { "lifetag server is running" }

/// CORS from the configured allow-list. Unparseable origins are skipped.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
  let origins: Vec<HeaderValue> = config
    .allowed_origins
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// ─── Integration tests ────────────────────────────────────────────────────────
