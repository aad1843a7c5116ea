//! Handlers for the privileged surface.
//!
//! | Method | Path | Who |
//! |--------|------|-----|
//! | `GET`    | `/api/emergency` | any signed-in user |
//! | `DELETE` | `/api/emergency` | any signed-in user |
//! | `POST`   | `/api/admin/setup` | holder of the setup key |
//! | `GET`    | `/api/admin/users` | admin |
//! | `POST`   | `/api/admin/users/manager` | admin |
//! | `DELETE` | `/api/admin/users/:id` | admin |
//! | `POST`   | `/api/admin/password` | any signed-in user |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use lifetag_core::{
  record::EmergencyRecord,
  store::RecordStore,
  user::{NewUser, Role, User},
  validate::validate_email,
};

use crate::{
  AppState,
  auth::{self, AuthedUser, RequireAdmin},
  error::Error,
};

const MIN_PASSWORD_LEN: usize = 8;

// ─── Records ──────────────────────────────────────────────────────────────────

/// `GET /api/emergency` — every stored record, newest first.
pub async fn list_records<S>(
  State(state): State<AppState<S>>,
  _user: AuthedUser,
) -> Result<Json<Vec<EmergencyRecord>>, Error>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let records = state
    .store
    .list_records()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(records))
}

/// `DELETE /api/emergency` — bulk-clear; responds with the deleted count.
pub async fn clear_records<S>(
  State(state): State<AppState<S>>,
  _user: AuthedUser,
) -> Result<impl IntoResponse, Error>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = state
    .store
    .clear_records()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(json!({ "deleted": deleted })))
}

// ─── Setup ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupBody {
  pub setup_key: String,
  pub email:     String,
  pub password:  String,
}

/// `POST /api/admin/setup` — create the first admin account.
///
/// Gated on the environment-provided setup key and refused once any admin
/// exists. An empty configured key disables the endpoint entirely.
pub async fn setup<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SetupBody>,
) -> Result<impl IntoResponse, Error>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if state.config.setup_key.is_empty() || body.setup_key != state.config.setup_key {
    return Err(Error::Forbidden);
  }

  let exists = state
    .store
    .admin_exists()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if exists {
    return Err(Error::Conflict("an admin account already exists".to_owned()));
  }

  let user = create_account(&state, &body.email, &body.password, Role::Admin).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Users ────────────────────────────────────────────────────────────────────

/// `GET /api/admin/users`
pub async fn list_users<S>(
  State(state): State<AppState<S>>,
  _admin: RequireAdmin,
) -> Result<Json<Vec<User>>, Error>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let users = state
    .store
    .list_users()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct CreateManagerBody {
  pub email:    String,
  pub password: String,
}

/// `POST /api/admin/users/manager` — body: `{"email": …, "password": …}`
pub async fn create_manager<S>(
  State(state): State<AppState<S>>,
  _admin: RequireAdmin,
  Json(body): Json<CreateManagerBody>,
) -> Result<impl IntoResponse, Error>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = create_account(&state, &body.email, &body.password, Role::Manager).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `DELETE /api/admin/users/:id`
pub async fn delete_user<S>(
  State(state): State<AppState<S>>,
  RequireAdmin(admin): RequireAdmin,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Error>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if admin.user_id == id {
    return Err(Error::BadRequest("cannot delete your own account".to_owned()));
  }

  let removed = state
    .store
    .delete_user(id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if !removed {
    return Err(Error::NotFound(format!("user {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
  pub current_password: String,
  pub new_password:     String,
}

/// `POST /api/admin/password` — change the caller's own password.
pub async fn change_password<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
  Json(body): Json<ChangePasswordBody>,
) -> Result<impl IntoResponse, Error>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !auth::verify_password(&body.current_password, &user.password_hash) {
    return Err(Error::BadRequest("current password is incorrect".to_owned()));
  }
  if body.new_password.len() < MIN_PASSWORD_LEN {
    return Err(Error::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  let hash = auth::hash_password(&body.new_password)?;
  state
    .store
    .set_password_hash(user.user_id, hash)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Shared ───────────────────────────────────────────────────────────────────

/// Validate inputs and create an account with the given role.
async fn create_account<S>(
  state: &AppState<S>,
  email: &str,
  password: &str,
  role: Role,
) -> Result<User, Error>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = email.trim().to_lowercase();
  if !validate_email(&email) {
    return Err(Error::BadRequest(format!("invalid email address: {email:?}")));
  }
  if password.len() < MIN_PASSWORD_LEN {
    return Err(Error::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  // The store enforces uniqueness too; checking first turns the failure
  // into a clean 409 instead of a backend error.
  let taken = state
    .store
    .find_user_by_email(&email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .is_some();
  if taken {
    return Err(Error::Conflict(format!("email already in use: {email}")));
  }

  let user = state
    .store
    .create_user(NewUser {
      email,
      password_hash: auth::hash_password(password)?,
      role,
    })
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok(user)
}
