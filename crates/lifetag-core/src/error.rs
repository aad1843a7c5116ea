//! Error types for `lifetag-core`.
//!
//! Validation variants double as the human-readable reasons reported back to
//! the submitter, so their display strings are written for end users.

use thiserror::Error;

use crate::contacts::MAX_CONTACTS;

#[derive(Debug, Error)]
pub enum Error {
  #[error("full name is required")]
  MissingFullName,

  #[error("phone number is required")]
  MissingPhoneNumber,

  #[error("date of birth is required")]
  MissingDateOfBirth,

  #[error("email address is required")]
  MissingEmail,

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("invalid phone number: {0:?}")]
  InvalidPhone(String),

  #[error("at least one emergency contact is required")]
  NoContacts,

  #[error("at most {max} emergency contacts are allowed", max = MAX_CONTACTS)]
  TooManyContacts,

  #[error("emergency contact {0} is missing a name")]
  ContactMissingName(usize),

  #[error("emergency contact {0} is missing a phone number")]
  ContactMissingPhone(usize),

  #[error("emergency contact {0} has an invalid phone number")]
  ContactInvalidPhone(usize),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
