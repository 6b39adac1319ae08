/// Input validators
///
/// Shape and length checks for everything a client can submit.
/// Every validator returns the trimmed value on success.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321

pub const MIN_QUESTION_LENGTH: usize = 10;
pub const MIN_ANSWER_LENGTH: usize = 5;
pub const MAX_TEXT_LENGTH: usize = 1000;

lazy_static! {
    // local@domain.tld
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// Validates an email address and returns it trimmed (case preserved).
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates free text (question or answer body) by character count.
pub fn is_valid_text(
    field: &str,
    text: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }

    let length = trimmed.chars().count();
    if length < min {
        return Err(ValidationError::TooShort(field.to_string(), min));
    }
    if length > max {
        return Err(ValidationError::TooLong(field.to_string(), max));
    }

    Ok(trimmed.to_string())
}
