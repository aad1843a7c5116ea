//! Server error type and [`axum::response::IntoResponse`] implementation.
//!
//! Error bodies are JSON `{"error": "..."}`. Validation failures surface the
//! core error's display string — those are written for the submitter.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("{0}")]
  Validation(#[from] lifetag_core::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("password hashing error: {0}")]
  Hash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"lifetag\""),
        );
        return res;
      }
      Error::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
      Error::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      Error::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
      Error::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      Error::Hash(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
      Error::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
