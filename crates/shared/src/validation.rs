//! Parsing helpers for raw query-string values.
//!
//! Every helper returns a `validator::ValidationError` carrying a
//! human-readable message so callers can attach it to the offending field.

use chrono::NaiveDate;
use validator::ValidationError;

/// Date format accepted by listing filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Parses a calendar date in `YYYY-MM-DD` format.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        error(
            "date_format",
            format!("'{}' is not a valid date (expected YYYY-MM-DD)", value),
        )
    })
}

/// Parses a strictly positive record id.
pub fn parse_positive_id(value: &str) -> Result<i64, ValidationError> {
    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(error(
            "id_format",
            format!("'{}' is not a valid id (expected a positive integer)", value),
        )),
    }
}

/// Parses any integer. Range checks are left to the caller.
pub fn parse_integer(value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| error("integer", format!("'{}' is not an integer", value)))
}

/// Checks that a value belongs to an allow-list.
pub fn validate_one_of(value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(error(
            "one_of",
            format!("'{}' must be one of: {}", value, allowed.join(", ")),
        ))
    }
}

/// Longest display name accepted on create.
pub const MAX_NAME_LEN: usize = 100;

/// Checks a display name after trimming: 1 to `MAX_NAME_LEN` characters.
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if (1..=MAX_NAME_LEN).contains(&len) {
        Ok(())
    } else {
        Err(error(
            "name_length",
            format!("Name must be 1-{} characters", MAX_NAME_LEN),
        ))
    }
}

/// Returns the trimmed value, or `None` when it is blank.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
