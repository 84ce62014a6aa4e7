//! Custom field validators shared by request models

use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// ISBN-10 or ISBN-13 without separators (ISBN-10 may end with `X`)
pub static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(97(8|9))?\d{9}(\d|X)$").expect("valid ISBN regex"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Reject empty or whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("not_blank", "must not be blank"));
    }
    Ok(())
}

/// Require at least one uppercase letter, one lowercase letter and one digit
pub fn password_strength(value: &str) -> Result<(), ValidationError> {
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());

    if has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(error(
            "password_strength",
            "Password must contain at least one uppercase letter, one lowercase letter, and one digit",
        ))
    }
}

/// Reject dates after today (UTC)
pub fn past_or_present(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value > Utc::now().date_naive() {
        return Err(error("past_or_present", "Publication date must not be in the future"));
    }
    Ok(())
}
