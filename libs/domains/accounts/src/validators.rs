//! Field validators shared by the account models
//!
//! The `validate_*` functions have the shape `validator`'s
//! `custom(function = ...)` attribute expects.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::ValidationError;

/// Iranian mobile numbers: optional `+98` or `0` prefix, then `9` and nine digits
static IRANIAN_CELLPHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+98|0)?9\d{9}$").unwrap());

pub const ZIPCODE_LENGTH: usize = 10;

pub fn validate_iranian_cellphone_number(value: &str) -> Result<(), ValidationError> {
    if !IRANIAN_CELLPHONE.is_match(value) {
        return Err(ValidationError::new("invalid_phone_number").with_message(Cow::Borrowed(
            "Enter a valid Iranian mobile number, e.g. 09121234567",
        )));
    }
    Ok(())
}

/// Profile phone numbers may be left blank
pub(crate) fn validate_optional_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    validate_iranian_cellphone_number(value)
}

/// Blank, or exactly ten characters
pub fn validate_zipcode(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.chars().count() == ZIPCODE_LENGTH {
        return Ok(());
    }
    Err(ValidationError::new("invalid_zipcode")
        .with_message(Cow::Borrowed("Zipcode must be exactly 10 characters")))
}

/// Trim and lower-case the domain part, leaving the local part untouched
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
