//! Pure input checks shared by the service layer and the HTTP adapter.
//!
//! Predicates (`is_valid_*`) answer yes/no; the `validate_*` helpers return a
//! [`ValidationError`] naming the offending field.

use crate::models::{ScheduleStatus, TaskStatus, VisitStatus};

pub const MIN_TEXT_LEN: usize = 2;
pub const MAX_TEXT_LEN: usize = 255;
pub const MIN_DESCRIPTION_LEN: usize = 10;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_PAGE_LIMIT: usize = 100;

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

/// Latitude in [-90, 90] and longitude in [-180, 180]. NaN is never valid.
pub fn is_valid_coordinates(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

/// Strict `HH:MM-HH:MM` shape check.
///
/// Only the layout is checked: `"99:99-99:99"` passes.
pub fn is_valid_shift_time(shift_time: &str) -> bool {
    let bytes = shift_time.as_bytes();
    if bytes.len() != 11 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        2 | 8 => *b == b':',
        5 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

pub fn is_valid_schedule_status(status: &str) -> bool {
    status.parse::<ScheduleStatus>().is_ok()
}

pub fn is_valid_visit_status(status: &str) -> bool {
    status.parse::<VisitStatus>().is_ok()
}

pub fn is_valid_task_status(status: &str) -> bool {
    status.parse::<TaskStatus>().is_ok()
}

fn validate_length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {} characters", min, max),
        ));
    }
    Ok(())
}

pub fn validate_client_name(client_name: &str) -> ValidationResult {
    validate_length("clientName", client_name, MIN_TEXT_LEN, MAX_TEXT_LEN)
}

pub fn validate_location(location: &str) -> ValidationResult {
    validate_length("location", location, MIN_TEXT_LEN, MAX_TEXT_LEN)
}

pub fn validate_shift_time(shift_time: &str) -> ValidationResult {
    if !is_valid_shift_time(shift_time) {
        return Err(ValidationError::new(
            "shiftTime",
            "must be in HH:MM-HH:MM format",
        ));
    }
    Ok(())
}

pub fn validate_task_name(name: &str) -> ValidationResult {
    validate_length("name", name, MIN_TEXT_LEN, MAX_TEXT_LEN)
}

/// Descriptions are optional; when given they must be 10..=1000 characters.
pub fn validate_task_description(description: Option<&str>) -> ValidationResult {
    match description {
        Some(text) => validate_length("description", text, MIN_DESCRIPTION_LEN, MAX_DESCRIPTION_LEN),
        None => Ok(()),
    }
}

/// `page >= 1` and `1 <= limit <= 100`.
pub fn validate_pagination(page: usize, limit: usize) -> ValidationResult {
    if page < 1 {
        return Err(ValidationError::new("page", "must be at least 1"));
    }
    if limit < 1 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::new(
            "limit",
            format!("must be between 1 and {}", MAX_PAGE_LIMIT),
        ));
    }
    Ok(())
}

pub fn validate_search_query(query: &str) -> ValidationResult {
    if query.trim().is_empty() {
        return Err(ValidationError::new("q", "search query is required"));
    }
    Ok(())
}

pub fn validate_coordinates(field: &str, latitude: f64, longitude: f64) -> ValidationResult {
    if !is_valid_coordinates(latitude, longitude) {
        return Err(ValidationError::new(field, "invalid geolocation coordinates"));
    }
    Ok(())
}
