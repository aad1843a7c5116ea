//! Identifier shape validation.
//!
//! Pure, total functions over arbitrary strings. Both validators reject any
//! input carrying leading or trailing whitespace outright; normalization is
//! the caller's job, these only judge.

/// Whether `input` is an acceptable email address.
///
/// Accepts exactly one `@` separating a non-empty local part from a dotted
/// domain. Consecutive dots and embedded whitespace are rejected anywhere.
pub fn validate_email(input: &str) -> bool {
  if input.is_empty() || input.trim() != input {
    return false;
  }
  if input.contains("..") || input.chars().any(char::is_whitespace) {
    return false;
  }

  let Some((local, domain)) = input.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.is_empty() || domain.contains('@') {
    return false;
  }

  // Domain needs a dot with non-empty segments on both sides.
  match domain.rsplit_once('.') {
    Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
    None => false,
  }
}

/// Whether `input` is an acceptable phone number.
///
/// After stripping internal whitespace and dashes, the remainder must be an
/// optional `+` followed by 10–15 ASCII digits, the first of them non-zero.
/// A number that is one digit repeated (e.g. all zeros) is rejected.
pub fn validate_phone(input: &str) -> bool {
  if input.is_empty() || input.trim() != input {
    return false;
  }

  let normalized: String = input
    .chars()
    .filter(|c| !c.is_whitespace() && *c != '-')
    .collect();
  let digits = normalized.strip_prefix('+').unwrap_or(&normalized);

  if digits.len() < 10 || digits.len() > 15 {
    return false;
  }
  if !digits.chars().all(|c| c.is_ascii_digit()) {
    return false;
  }
  if digits.starts_with('0') {
    return false;
  }

  // Reject single-repeated-digit sequences.
  let mut chars = digits.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  if chars.all(|c| c == first) {
    return false;
  }

  true
}

#[cfg(test)]
mod tests {
  use super::*;

  // ── Email ───────────────────────────────────────────────────────────────

  #[test]
  fn email_accepts_common_forms() {
    for e in [
      "user@example.com",
      "first.last@domain.co.in",
      "user+tag@sub.domain.org",
      "a@b.io",
    ] {
      assert!(validate_email(e), "expected valid: {e:?}");
    }
  }

  #[test]
  fn email_rejects_obvious_invalids() {
    for e in [
      "",
      "plainaddress",
      "@no-local-part.com",
      "user@",
      "user@.com",
      "user@domain",
      "user@domain.",
      "user@domain..com",
      "user@@domain.com",
      "us er@domain.com",
    ] {
      assert!(!validate_email(e), "expected invalid: {e:?}");
    }
  }

  #[test]
  fn email_rejects_surrounding_whitespace() {
    for e in [" user@example.com", "user@example.com ", "\tuser@example.com"] {
      assert!(!validate_email(e), "expected invalid: {e:?}");
    }
  }

  // ── Phone ───────────────────────────────────────────────────────────────

  #[test]
  fn phone_accepts_e164_and_bare_forms() {
    for p in [
      "+919876543210",
      "9876543210",
      "+1 2025550123",
      "+442071838750",
      "+91-9876543210",
    ] {
      assert!(validate_phone(p), "expected valid: {p:?}");
    }
  }

  #[test]
  fn phone_rejects_obvious_invalids() {
    for p in [
      "",
      "123",
      "abcdefghij",
      "+",
      "++++",
      "+9100",
      "++919876543210",
      "987654321",
      "0919876543210",
      "98765432101234567",
    ] {
      assert!(!validate_phone(p), "expected invalid: {p:?}");
    }
  }

  #[test]
  fn phone_rejects_surrounding_whitespace() {
    for p in [" 9876543210", "9876543210 ", " +919876543210 "] {
      assert!(!validate_phone(p), "expected invalid: {p:?}");
    }
  }

  #[test]
  fn phone_rejects_repeated_digit_sequences() {
    assert!(!validate_phone("1111111111"));
    assert!(!validate_phone("+99999999999"));
    // Repeated digits with one difference are fine.
    assert!(validate_phone("1111111112"));
  }

  #[test]
  fn phone_rejects_unicode_digits() {
    // Devanagari digits normalize to non-ASCII and must not pass.
    assert!(!validate_phone("९८७६५४३२१०"));
    assert!(!validate_phone("٩٨٧٦٥٤٣٢١٠"));
  }
}
