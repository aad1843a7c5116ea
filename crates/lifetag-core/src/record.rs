//! The emergency record — the document a QR profile renders.
//!
//! Wire form is camelCase JSON. Optional free-text fields are `None` when
//! absent, never the empty string; [`non_empty`] is the single place that
//! conversion happens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  contacts::{ContactList, EmergencyContact},
  validate::{validate_email, validate_phone},
};

/// Turn a possibly-blank form value into an explicit absence.
pub fn non_empty(value: impl Into<String>) -> Option<String> {
  let value: String = value.into();
  let trimmed = value.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_owned())
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A stored emergency record.
///
/// `qr_payload` and `created_at` are assigned when the record is first
/// created and survive every subsequent edit unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRecord {
  pub record_id:          Uuid,
  pub full_name:          String,
  /// Primary identifier; required and unique.
  pub phone_number:       String,
  /// Secondary identifier; validated when present.
  pub email:              Option<String>,
  pub blood_type:         Option<String>,
  pub allergies:          Option<String>,
  pub medications:        Option<String>,
  pub medical_conditions: Option<String>,
  pub address:            Option<String>,
  pub date_of_birth:      Option<String>,
  /// Reference to an uploaded image stored out-of-band.
  pub photo_ref:          Option<String>,
  /// Legacy single-contact mode: bare secondary phone strings.
  #[serde(default)]
  pub alternate_numbers:  Vec<String>,
  /// Structured contacts; always 1–5 fully-populated entries.
  pub emergency_contacts: Vec<EmergencyContact>,
  /// The URL encoded into the QR image. Never regenerated.
  pub qr_payload:         String,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

// ─── NewRecord ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecordStore::upsert_record`].
///
/// `record_id`, `created_at`, and `updated_at` are always set by the store.
/// `qr_payload` here is the candidate used on first insert; when the phone
/// number already names a record, the stored payload wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
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
  #[serde(default)]
  pub alternate_numbers:  Vec<String>,
  pub emergency_contacts: Vec<EmergencyContact>,
  pub qr_payload:         String,
}

impl NewRecord {
  /// Check the submission rules.
  ///
  /// Name, phone, and date of birth must be present; email is validated
  /// when given and additionally required when `require_email` is set (the
  /// required-identifier set is a deployment choice). Contacts must be
  /// within bounds, fully populated, and carry well-formed phone numbers.
  pub fn validate(&self, require_email: bool) -> Result<()> {
    if self.full_name.trim().is_empty() {
      return Err(Error::MissingFullName);
    }
    if self.phone_number.trim().is_empty() {
      return Err(Error::MissingPhoneNumber);
    }
    if !validate_phone(&self.phone_number) {
      return Err(Error::InvalidPhone(self.phone_number.clone()));
    }
    if self.date_of_birth.as_deref().map(str::trim).unwrap_or("").is_empty() {
      return Err(Error::MissingDateOfBirth);
    }

    match &self.email {
      Some(email) if !validate_email(email) => {
        return Err(Error::InvalidEmail(email.clone()));
      }
      None if require_email => return Err(Error::MissingEmail),
      _ => {}
    }

    for number in &self.alternate_numbers {
      if !validate_phone(number) {
        return Err(Error::InvalidPhone(number.clone()));
      }
    }

    let contacts = ContactList::try_from_vec(self.emergency_contacts.clone())?;
    contacts.validate_phones()?;

    Ok(())
  }
}

// ─── UpsertOutcome ───────────────────────────────────────────────────────────

/// Result of an upsert: the stored record plus whether it was newly created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
  pub record:  EmergencyRecord,
  pub created: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft() -> NewRecord {
    NewRecord {
      full_name:          "User Name".into(),
      phone_number:       "9876543210".into(),
      email:              Some("user@example.com".into()),
      blood_type:         Some("O+".into()),
      allergies:          None,
      medications:        None,
      medical_conditions: None,
      address:            None,
      date_of_birth:      Some("2000-01-01".into()),
      photo_ref:          None,
      alternate_numbers:  vec![],
      emergency_contacts: vec![EmergencyContact {
        name:  "Contact One".into(),
        phone: "+919876543210".into(),
      }],
      qr_payload: "https://lifetag.example/emergencyinfo/9876543210".into(),
    }
  }

  #[test]
  fn non_empty_maps_blanks_to_none() {
    assert_eq!(non_empty(""), None);
    assert_eq!(non_empty("   "), None);
    assert_eq!(non_empty(" O+ "), Some("O+".to_owned()));
  }

  #[test]
  fn valid_draft_passes() {
    assert!(draft().validate(false).is_ok());
  }

  #[test]
  fn validate_requires_name_phone_dob() {
    let mut d = draft();
    d.full_name = "  ".into();
    assert!(matches!(d.validate(false), Err(Error::MissingFullName)));

    let mut d = draft();
    d.phone_number = String::new();
    assert!(matches!(d.validate(false), Err(Error::MissingPhoneNumber)));

    let mut d = draft();
    d.date_of_birth = None;
    assert!(matches!(d.validate(false), Err(Error::MissingDateOfBirth)));
  }

  #[test]
  fn validate_checks_identifier_shapes() {
    let mut d = draft();
    d.phone_number = "123".into();
    assert!(matches!(d.validate(false), Err(Error::InvalidPhone(_))));

    let mut d = draft();
    d.email = Some("user@domain..com".into());
    assert!(matches!(d.validate(false), Err(Error::InvalidEmail(_))));
  }

  #[test]
  fn email_requirement_is_a_config_choice() {
    let mut d = draft();
    d.email = None;
    assert!(d.validate(false).is_ok());
    assert!(matches!(d.validate(true), Err(Error::MissingEmail)));
  }

  #[test]
  fn validate_checks_alternate_numbers() {
    let mut d = draft();
    d.alternate_numbers = vec!["+919876543211".into(), "nope".into()];
    assert!(matches!(d.validate(false), Err(Error::InvalidPhone(_))));
  }

  #[test]
  fn validate_bounds_and_checks_contacts() {
    let mut d = draft();
    d.emergency_contacts.clear();
    assert!(matches!(d.validate(false), Err(Error::NoContacts)));

    let mut d = draft();
    d.emergency_contacts[0].phone = "12".into();
    assert!(matches!(d.validate(false), Err(Error::ContactInvalidPhone(0))));
  }

  #[test]
  fn record_json_round_trip_preserves_contacts() {
    let record = EmergencyRecord {
      record_id:          Uuid::new_v4(),
      full_name:          "User Name".into(),
      phone_number:       "9876543210".into(),
      email:              Some("user@example.com".into()),
      blood_type:         Some("B-".into()),
      allergies:          None,
      medications:        Some("None".into()),
      medical_conditions: None,
      address:            None,
      date_of_birth:      Some("2000-01-01".into()),
      photo_ref:          None,
      alternate_numbers:  vec!["+919876543299".into()],
      emergency_contacts: (1..=5)
        .map(|i| EmergencyContact {
          name:  format!("Contact {i}"),
          phone: format!("+91987654321{i}"),
        })
        .collect(),
      qr_payload: "https://lifetag.example/emergencyinfo/9876543210".into(),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };

    let json = serde_json::to_string(&record).unwrap();
    // Wire form is camelCase.
    assert!(json.contains("\"fullName\""), "json: {json}");
    assert!(json.contains("\"emergencyContacts\""), "json: {json}");

    let back: EmergencyRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.emergency_contacts.len(), 5);
    assert_eq!(back.emergency_contacts, record.emergency_contacts);
    assert_eq!(back.qr_payload, record.qr_payload);
    assert_eq!(back.alternate_numbers, record.alternate_numbers);
  }
}
