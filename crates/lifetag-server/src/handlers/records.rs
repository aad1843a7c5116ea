//! Handlers for the public record endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/emergency` | Multipart submission; requires `consent` |
//! | `PUT`  | `/api/emergency` | JSON edit of an existing record (authenticated) |
//! | `GET`  | `/api/emergency/email/:email` | 404 if not found |
//! | `GET`  | `/api/emergency/phone/:phone` | 404 if not found |

use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use serde::Deserialize;

use lifetag_core::{
  contacts::EmergencyContact,
  identifier,
  record::{EmergencyRecord, NewRecord, non_empty},
  store::RecordStore,
};

use crate::{AppState, auth::AuthedUser, error::Error, upload};

const CONSENT_REQUIRED: &str =
  "Please confirm your consent to store and share this information";

// ─── Submission ───────────────────────────────────────────────────────────────

/// Text fields accumulated from the multipart stream.
#[derive(Debug, Default)]
struct SubmissionFields {
  full_name:          String,
  email:              String,
  phone_number:       String,
  blood_type:         String,
  allergies:          String,
  medications:        String,
  medical_conditions: String,
  address:            String,
  date_of_birth:      String,
  alternate_numbers:  Vec<String>,
  emergency_contacts: Vec<EmergencyContact>,
  consent:            bool,
}

impl SubmissionFields {
  fn set(&mut self, name: &str, value: String) -> Result<(), Error> {
    match name {
      "fullName" => self.full_name = value,
      "email" => self.email = value,
      "phoneNumber" => self.phone_number = value,
      "bloodType" => self.blood_type = value,
      "allergies" => self.allergies = value,
      "medications" => self.medications = value,
      "medicalConditions" => self.medical_conditions = value,
      "address" => self.address = value,
      "dateOfBirth" => self.date_of_birth = value,
      // Legacy single-contact mode fields.
      "alternateNumber1" | "alternateNumber2" => {
        if !value.trim().is_empty() {
          self.alternate_numbers.push(value.trim().to_owned());
        }
      }
      "emergencyContacts" => {
        self.emergency_contacts = serde_json::from_str(&value).map_err(|_| {
          Error::BadRequest(
            "emergencyContacts must be a JSON array of {name, phone} objects"
              .to_owned(),
          )
        })?;
      }
      "consent" => {
        self.consent =
          matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes");
      }
      // Unknown fields (e.g. a client-computed qrCode) are ignored; the
      // payload is server-generated.
      _ => {}
    }
    Ok(())
  }
}

struct PhotoPart {
  data:       Bytes,
  media_type: Option<String>,
}

/// `POST /api/emergency` — multipart form submission, upsert semantics.
///
/// 201 with the stored record on create, 200 on update of an existing
/// record (matched case-insensitively by phone number).
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, Error>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut fields = SubmissionFields::default();
  let mut photo: Option<PhotoPart> = None;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| Error::BadRequest(e.to_string()))?
  {
    let Some(name) = field.name().map(str::to_owned) else {
      continue;
    };

    if name == "photo" {
      let media_type = field.content_type().map(str::to_owned);
      let data = field
        .bytes()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?;
      if !data.is_empty() {
        photo = Some(PhotoPart { data, media_type });
      }
    } else {
      let value = field
        .text()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?;
      fields.set(&name, value)?;
    }
  }

  if !fields.consent {
    return Err(Error::BadRequest(CONSENT_REQUIRED.to_owned()));
  }

  let photo_ref = match &photo {
    Some(part) => Some(
      upload::save_photo(
        &state.config.upload_dir,
        &part.data,
        part.media_type.as_deref(),
      )
      .await?,
    ),
    None => None,
  };

  let phone_number = fields.phone_number.trim().to_owned();
  let input = NewRecord {
    full_name:          fields.full_name.trim().to_owned(),
    phone_number:       phone_number.clone(),
    email:              non_empty(fields.email),
    blood_type:         non_empty(fields.blood_type),
    allergies:          non_empty(fields.allergies),
    medications:        non_empty(fields.medications),
    medical_conditions: non_empty(fields.medical_conditions),
    address:            non_empty(fields.address),
    date_of_birth:      non_empty(fields.date_of_birth),
    photo_ref,
    alternate_numbers:  fields.alternate_numbers,
    emergency_contacts: fields.emergency_contacts,
    qr_payload: identifier::qr_payload(&state.config.base_url, &phone_number),
  };

  input.validate(state.config.require_email)?;

  let outcome = state
    .store
    .upsert_record(input)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let status = if outcome.created {
    StatusCode::CREATED
  } else {
    StatusCode::OK
  };
  Ok((status, Json(outcome.record)))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /api/emergency`. Everything except the QR
/// payload, which is never client-supplied.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBody {
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
}

/// `PUT /api/emergency` — edit an existing record. May change any field
/// except `qrPayload`; 404 when the phone number names no record.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _user: AuthedUser,
  Json(body): Json<EditBody>,
) -> Result<Json<EmergencyRecord>, Error>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let phone_number = body.phone_number.trim().to_owned();

  let existing = state
    .store
    .find_by_phone(&phone_number)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| {
      Error::NotFound(format!("no record for phone number {phone_number:?}"))
    })?;

  let input = NewRecord {
    full_name:          body.full_name.trim().to_owned(),
    phone_number,
    email:              body.email.and_then(non_empty),
    blood_type:         body.blood_type.and_then(non_empty),
    allergies:          body.allergies.and_then(non_empty),
    medications:        body.medications.and_then(non_empty),
    medical_conditions: body.medical_conditions.and_then(non_empty),
    address:            body.address.and_then(non_empty),
    date_of_birth:      body.date_of_birth.and_then(non_empty),
    photo_ref:          body.photo_ref.and_then(non_empty),
    alternate_numbers:  body.alternate_numbers,
    emergency_contacts: body.emergency_contacts,
    // Ignored on update; the stored payload wins.
    qr_payload:         existing.qr_payload,
  };

  input.validate(state.config.require_email)?;

  let outcome = state
    .store
    .upsert_record(input)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(outcome.record))
}

// ─── Lookups ──────────────────────────────────────────────────────────────────

/// `GET /api/emergency/email/:email`
pub async fn by_email<S>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
) -> Result<Json<EmergencyRecord>, Error>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = identifier::normalize(&raw);
  if email.is_empty() {
    return Err(Error::BadRequest("an email address is required".to_owned()));
  }

  state
    .store
    .find_by_email(&email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .map(Json)
    .ok_or_else(|| Error::NotFound("emergency info not found".to_owned()))
}

/// `GET /api/emergency/phone/:phone`
pub async fn by_phone<S>(
  State(state): State<AppState<S>>,
  Path(raw): Path<String>,
) -> Result<Json<EmergencyRecord>, Error>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let phone = identifier::normalize(&raw);
  if phone.is_empty() {
    return Err(Error::BadRequest("a phone number is required".to_owned()));
  }

  state
    .store
    .find_by_phone(&phone)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .map(Json)
    .ok_or_else(|| Error::NotFound("emergency info not found".to_owned()))
}
