//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. List-shaped fields
//! (alternate numbers, emergency contacts) are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use lifetag_core::{
  contacts::EmergencyContact,
  record::EmergencyRecord,
  user::{Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str {
  match role {
    Role::Admin => "admin",
    Role::Manager => "manager",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "admin" => Ok(Role::Admin),
    "manager" => Ok(Role::Manager),
    other => Err(Error::UnknownRole(other.to_owned())),
  }
}

// ─── JSON list columns ───────────────────────────────────────────────────────

pub fn encode_contacts(contacts: &[EmergencyContact]) -> Result<String> {
  Ok(serde_json::to_string(contacts)?)
}

pub fn decode_contacts(s: &str) -> Result<Vec<EmergencyContact>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_strings(values: &[String]) -> Result<String> {
  Ok(serde_json::to_string(values)?)
}

pub fn decode_strings(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `records` row.
pub struct RawRecord {
  pub record_id:          String,
  pub full_name:          String,
  pub phone_number:       String,
  pub email:              Option<String>,
  pub blood_type:         Option<String>,
  pub allergies:          Option<String>,
  pub medications:        Option<String>,
  pub medical_conditions: Option<String>,
  pub address:            Option<String>,
  pub date_of_birth:      Option<String>,
  pub photo_ref:          Option<String>,
  pub alternate_numbers:  String,
  pub emergency_contacts: String,
  pub qr_payload:         String,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawRecord {
  /// Read the column set selected by `RECORD_COLUMNS`, in order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:          row.get(0)?,
      full_name:          row.get(1)?,
      phone_number:       row.get(2)?,
      email:              row.get(3)?,
      blood_type:         row.get(4)?,
      allergies:          row.get(5)?,
      medications:        row.get(6)?,
      medical_conditions: row.get(7)?,
      address:            row.get(8)?,
      date_of_birth:      row.get(9)?,
      photo_ref:          row.get(10)?,
      alternate_numbers:  row.get(11)?,
      emergency_contacts: row.get(12)?,
      qr_payload:         row.get(13)?,
      created_at:         row.get(14)?,
      updated_at:         row.get(15)?,
    })
  }

  pub fn into_record(self) -> Result<EmergencyRecord> {
    Ok(EmergencyRecord {
      record_id:          decode_uuid(&self.record_id)?,
      full_name:          self.full_name,
      phone_number:       self.phone_number,
      email:              self.email,
      blood_type:         self.blood_type,
      allergies:          self.allergies,
      medications:        self.medications,
      medical_conditions: self.medical_conditions,
      address:            self.address,
      date_of_birth:      self.date_of_birth,
      photo_ref:          self.photo_ref,
      alternate_numbers:  decode_strings(&self.alternate_numbers)?,
      emergency_contacts: decode_contacts(&self.emergency_contacts)?,
      qr_payload:         self.qr_payload,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub password_hash: String,
  pub role:          String,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      role:          row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      email:         self.email,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
