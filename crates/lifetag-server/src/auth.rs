//! HTTP Basic-auth extractors backed by the users table.
//!
//! Credentials are `email:password`; the password is verified against the
//! stored argon2 PHC string. Handlers take [`AuthedUser`] for any signed-in
//! user or [`RequireAdmin`] for the admin role.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;

use lifetag_core::{
  store::RecordStore,
  user::{Role, User},
};

use crate::{AppState, error::Error};

/// Hash a password into an argon2 PHC string for storage.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Verify a plaintext password against a stored PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(stored_hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Resolve and verify the Basic credentials in `headers` against the store.
pub async fn verify_basic<S>(headers: &HeaderMap, store: &S) -> Result<User, Error>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let user = store
    .find_user_by_email(email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::Unauthorized)?;

  if !verify_password(password, &user.password_hash) {
    return Err(Error::Unauthorized);
  }

  Ok(user)
}

/// Present in a handler means the request carried valid credentials.
pub struct AuthedUser(pub User);

impl<S> FromRequestParts<AppState<S>> for AuthedUser
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = verify_basic(&parts.headers, state.store.as_ref()).await?;
    Ok(AuthedUser(user))
  }
}

/// Like [`AuthedUser`], but additionally requires [`Role::Admin`].
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<AppState<S>> for RequireAdmin
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = verify_basic(&parts.headers, state.store.as_ref()).await?;
    if user.role != Role::Admin {
      return Err(Error::Forbidden);
    }
    Ok(RequireAdmin(user))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{path::PathBuf, sync::Arc};

  use axum::http::{Request, header};
  use lifetag_core::user::NewUser;
  use lifetag_store_sqlite::SqliteStore;

  use crate::ServerConfig;

  async fn make_state(password: &str, role: Role) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .create_user(NewUser {
        email:         "user@example.com".to_string(),
        password_hash: hash_password(password).unwrap(),
        role,
      })
      .await
      .unwrap();

    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        host:             "127.0.0.1".to_string(),
        port:             5180,
        base_url:         "http://localhost:5180".to_string(),
        store_path:       PathBuf::from(":memory:"),
        upload_dir:       std::env::temp_dir(),
        setup_key:        String::new(),
        allowed_origins:  vec![],
        require_email:    false,
        max_upload_bytes: 1024,
      }),
    }
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  async fn extract_user(
    req: Request<axum::body::Body>,
    state: &AppState<SqliteStore>,
  ) -> Result<AuthedUser, Error> {
    let (mut parts, _) = req.into_parts();
    AuthedUser::from_request_parts(&mut parts, state).await
  }

  #[tokio::test]
  async fn correct_credentials() {
    let state = make_state("secret", Role::Manager).await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("user@example.com", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    let user = extract_user(req, &state).await.unwrap();
    assert_eq!(user.0.email, "user@example.com");
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = make_state("secret", Role::Manager).await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("user@example.com", "wrong"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract_user(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn unknown_user() {
    let state = make_state("secret", Role::Manager).await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("ghost@example.com", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract_user(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state("secret", Role::Manager).await;
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract_user(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = make_state("secret", Role::Manager).await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract_user(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn admin_extractor_rejects_managers() {
    let state = make_state("secret", Role::Manager).await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("user@example.com", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    let (mut parts, _) = req.into_parts();
    let result = RequireAdmin::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(Error::Forbidden)));
  }

  #[tokio::test]
  async fn admin_extractor_accepts_admins() {
    let state = make_state("secret", Role::Admin).await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("user@example.com", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    let (mut parts, _) = req.into_parts();
    assert!(RequireAdmin::from_request_parts(&mut parts, &state).await.is_ok());
  }

  #[test]
  fn hash_and_verify_round_trip() {
    let hash = hash_password("secret").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("secret", &hash));
    assert!(!verify_password("other", &hash));
    assert!(!verify_password("secret", "not-a-phc-string"));
  }
}
