//! Privileged accounts for the admin surface.
//!
//! Passwords live only as argon2 PHC strings; hashing and verification are
//! the server's concern, the store just carries the string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user is allowed to do. Admins additionally manage users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Manager,
}

/// A privileged account. The password hash never serializes to the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:    Uuid,
  /// Stored trimmed and lowercased; unique.
  pub email:      String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::create_user`].
/// `user_id` and `created_at` are set by the store; the email is normalized
/// (trimmed, lowercased) before storage.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub password_hash: String,
  pub role:          Role,
}
