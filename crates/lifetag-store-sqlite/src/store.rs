//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use lifetag_core::{
  record::{EmergencyRecord, NewRecord, UpsertOutcome},
  store::RecordStore,
  user::{NewUser, Role, User},
};

use crate::{
  Error, Result,
  encode::{
    RawRecord, RawUser, encode_contacts, encode_dt, encode_role, encode_strings,
    encode_uuid,
  },
  schema::SCHEMA,
};

/// Column list shared by every `records` SELECT; must stay in sync with
/// [`RawRecord::from_row`].
pub(crate) const RECORD_COLUMNS: &str = "record_id, full_name, phone_number, \
   email, blood_type, allergies, medications, medical_conditions, address, \
   date_of_birth, photo_ref, alternate_numbers, emergency_contacts, \
   qr_payload, created_at, updated_at";

const USER_COLUMNS: &str =
  "user_id, email, password_hash, role, created_at";

/// Normalize a user email the way the store keys it.
fn normalize_user_email(email: &str) -> String {
  email.trim().to_lowercase()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lifetag record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one record by a caller-supplied WHERE clause with a single
  /// positional parameter.
  async fn find_record_where(
    &self,
    where_clause: &'static str,
    param: String,
  ) -> Result<Option<EmergencyRecord>> {
    let sql =
      format!("SELECT {RECORD_COLUMNS} FROM records WHERE {where_clause}");

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], RawRecord::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  /// Insert a fully-built [`EmergencyRecord`] into the `records` table.
  async fn insert_record(&self, record: &EmergencyRecord) -> Result<()> {
    let record_id_str   = encode_uuid(record.record_id);
    let full_name       = record.full_name.clone();
    let phone_number    = record.phone_number.clone();
    let email           = record.email.clone();
    let blood_type      = record.blood_type.clone();
    let allergies       = record.allergies.clone();
    let medications     = record.medications.clone();
    let conditions      = record.medical_conditions.clone();
    let address         = record.address.clone();
    let date_of_birth   = record.date_of_birth.clone();
    let photo_ref       = record.photo_ref.clone();
    let alternates_str  = encode_strings(&record.alternate_numbers)?;
    let contacts_str    = encode_contacts(&record.emergency_contacts)?;
    let qr_payload      = record.qr_payload.clone();
    let created_at_str  = encode_dt(record.created_at);
    let updated_at_str  = encode_dt(record.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (
             record_id, full_name, phone_number, email, blood_type,
             allergies, medications, medical_conditions, address,
             date_of_birth, photo_ref, alternate_numbers,
             emergency_contacts, qr_payload, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16)",
          rusqlite::params![
            record_id_str,
            full_name,
            phone_number,
            email,
            blood_type,
            allergies,
            medications,
            conditions,
            address,
            date_of_birth,
            photo_ref,
            alternates_str,
            contacts_str,
            qr_payload,
            created_at_str,
            updated_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Replace every mutable column of an existing record.
  /// `qr_payload` and `created_at` are deliberately not in the SET list.
  async fn update_record(&self, record: &EmergencyRecord) -> Result<()> {
    let record_id_str  = encode_uuid(record.record_id);
    let full_name      = record.full_name.clone();
    let phone_number   = record.phone_number.clone();
    let email          = record.email.clone();
    let blood_type     = record.blood_type.clone();
    let allergies      = record.allergies.clone();
    let medications    = record.medications.clone();
    let conditions     = record.medical_conditions.clone();
    let address        = record.address.clone();
    let date_of_birth  = record.date_of_birth.clone();
    let photo_ref      = record.photo_ref.clone();
    let alternates_str = encode_strings(&record.alternate_numbers)?;
    let contacts_str   = encode_contacts(&record.emergency_contacts)?;
    let updated_at_str = encode_dt(record.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE records SET
             full_name = ?2, phone_number = ?3, email = ?4, blood_type = ?5,
             allergies = ?6, medications = ?7, medical_conditions = ?8,
             address = ?9, date_of_birth = ?10, photo_ref = ?11,
             alternate_numbers = ?12, emergency_contacts = ?13,
             updated_at = ?14
           WHERE record_id = ?1",
          rusqlite::params![
            record_id_str,
            full_name,
            phone_number,
            email,
            blood_type,
            allergies,
            medications,
            conditions,
            address,
            date_of_birth,
            photo_ref,
            alternates_str,
            contacts_str,
            updated_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Records ───────────────────────────────────────────────────────────────

  async fn upsert_record(&self, input: NewRecord) -> Result<UpsertOutcome> {
    let existing = self.find_by_phone(&input.phone_number).await?;
    let now = Utc::now();

    match existing {
      Some(prev) => {
        let record = EmergencyRecord {
          record_id:          prev.record_id,
          full_name:          input.full_name,
          phone_number:       input.phone_number,
          email:              input.email,
          blood_type:         input.blood_type,
          allergies:          input.allergies,
          medications:        input.medications,
          medical_conditions: input.medical_conditions,
          address:            input.address,
          date_of_birth:      input.date_of_birth,
          photo_ref:          input.photo_ref,
          alternate_numbers:  input.alternate_numbers,
          emergency_contacts: input.emergency_contacts,
          // The stored payload and creation time survive every edit.
          qr_payload:         prev.qr_payload,
          created_at:         prev.created_at,
          updated_at:         now,
        };
        self.update_record(&record).await?;
        Ok(UpsertOutcome { record, created: false })
      }
      None => {
        let record = EmergencyRecord {
          record_id:          Uuid::new_v4(),
          full_name:          input.full_name,
          phone_number:       input.phone_number,
          email:              input.email,
          blood_type:         input.blood_type,
          allergies:          input.allergies,
          medications:        input.medications,
          medical_conditions: input.medical_conditions,
          address:            input.address,
          date_of_birth:      input.date_of_birth,
          photo_ref:          input.photo_ref,
          alternate_numbers:  input.alternate_numbers,
          emergency_contacts: input.emergency_contacts,
          qr_payload:         input.qr_payload,
          created_at:         now,
          updated_at:         now,
        };
        self.insert_record(&record).await?;
        Ok(UpsertOutcome { record, created: true })
      }
    }
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<EmergencyRecord>> {
    self
      .find_record_where(
        "email IS NOT NULL AND LOWER(email) = LOWER(?1)",
        email.to_owned(),
      )
      .await
  }

  async fn find_by_phone(&self, phone: &str) -> Result<Option<EmergencyRecord>> {
    self
      .find_record_where("LOWER(phone_number) = LOWER(?1)", phone.to_owned())
      .await
  }

  async fn list_records(&self) -> Result<Vec<EmergencyRecord>> {
    let sql = format!(
      "SELECT {RECORD_COLUMNS} FROM records ORDER BY created_at DESC"
    );

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn clear_records(&self) -> Result<u64> {
    let deleted = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM records", [])?))
      .await?;
    Ok(deleted as u64)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let email = normalize_user_email(&input.email);

    if self.find_user_by_email(&email).await?.is_some() {
      return Err(Error::EmailTaken(email));
    }

    let user = User {
      user_id:       Uuid::new_v4(),
      email,
      password_hash: input.password_hash,
      role:          input.role,
      created_at:    Utc::now(),
    };

    let id_str    = encode_uuid(user.user_id);
    let email_str = user.email.clone();
    let hash_str  = user.password_hash.clone();
    let role_str  = encode_role(user.role).to_owned();
    let at_str    = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email_str, hash_str, role_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let needle = normalize_user_email(email);
    let sql = format!(
      "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER(?1)"
    );

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![needle], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let sql =
      format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn set_password_hash(&self, id: Uuid, hash: String) -> Result<bool> {
    let id_str = encode_uuid(id);
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET password_hash = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, hash],
        )?)
      })
      .await?;
    Ok(updated > 0)
  }

  async fn admin_exists(&self) -> Result<bool> {
    let role_str = encode_role(Role::Admin).to_owned();
    let found: Option<bool> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE role = ?1 LIMIT 1",
              rusqlite::params![role_str],
              |_| Ok(true),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(found.unwrap_or(false))
  }
}
