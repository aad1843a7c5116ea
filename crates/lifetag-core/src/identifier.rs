//! Identifier normalization and QR payload generation.
//!
//! An identifier is the email address or phone number a record is looked up
//! by. Identifiers arrive from URL paths and QR scans, so they may be
//! percent-encoded — possibly twice, possibly malformed. Normalization
//! decodes when it can and degrades to the raw string when it cannot.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Escape everything except RFC 3986 unreserved characters, mirroring what
/// the profile links embed in QR images.
const IDENTIFIER_SET: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'~');

/// Decode a raw path/query identifier and trim surrounding whitespace.
///
/// Invalid percent escapes or non-UTF-8 decodes fall back to the raw string
/// rather than failing; a garbled identifier should still be matchable
/// verbatim.
pub fn normalize(raw: &str) -> String {
  let decoded = match percent_decode_str(raw).decode_utf8() {
    Ok(s) => s.into_owned(),
    Err(_) => raw.to_owned(),
  };
  decoded.trim().to_owned()
}

/// Build the URL encoded into a record's QR image:
/// `<base-url>/emergencyinfo/<encoded-identifier>`.
///
/// Generated exactly once, at record creation; edits never regenerate it.
pub fn qr_payload(base_url: &str, identifier: &str) -> String {
  let base = base_url.trim_end_matches('/');
  let encoded = utf8_percent_encode(identifier, IDENTIFIER_SET);
  format!("{base}/emergencyinfo/{encoded}")
}
