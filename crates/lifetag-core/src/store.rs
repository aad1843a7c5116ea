//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `lifetag-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  record::{EmergencyRecord, NewRecord, UpsertOutcome},
  user::{NewUser, User},
};

/// Abstraction over an emergency-record backend.
///
/// Identifier lookups are case-insensitive exact matches. A miss is `None`,
/// never an error. All methods return `Send` futures so the trait can be
/// used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Records ───────────────────────────────────────────────────────────

  /// Create or replace a record, keyed case-insensitively by phone number.
  ///
  /// On insert the store assigns `record_id` and `created_at` and persists
  /// the candidate `qr_payload`. On update every field is replaced except
  /// `qr_payload` and `created_at`, which keep their stored values.
  fn upsert_record(
    &self,
    input: NewRecord,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + '_;

  /// Case-insensitive exact-match lookup by email.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<EmergencyRecord>, Self::Error>> + Send + 'a;

  /// Case-insensitive exact-match lookup by phone number.
  fn find_by_phone<'a>(
    &'a self,
    phone: &'a str,
  ) -> impl Future<Output = Result<Option<EmergencyRecord>, Self::Error>> + Send + 'a;

  /// All records, newest first. Privileged surface.
  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<EmergencyRecord>, Self::Error>> + Send + '_;

  /// Delete every record; returns the number removed. Privileged surface.
  fn clear_records(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user. Fails with a backend-specific error when the normalized
  /// email is already taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look up a user by email (trimmed, lowercased before matching).
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// All users, oldest first.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Delete a user by id; returns whether a row was removed.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Replace a user's password hash; returns whether a row was updated.
  fn set_password_hash(
    &self,
    id: Uuid,
    hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Whether any admin user exists. Gates first-run setup.
  fn admin_exists(
    &self,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
