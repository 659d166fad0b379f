// ============================
// crates/realtime-lib/src/validation.rs
// ============================
//! Request payload validation.

use hrms_common::ClientEvent;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MAX_RECORD_ID_LENGTH: usize = 64;
const MAX_REASON_LENGTH: usize = 500;

// Record ids are hex object ids or uuid-style strings
static RECORD_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid record id: {0}")]
    InvalidRecordId(String),

    #[error("Invalid rejection reason: {0}")]
    InvalidReason(String),

    #[error("Invalid review payload: {0}")]
    InvalidReviewPayload(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a store record id (leave request id, user id, profile id).
pub fn validate_record_id(id: &str) -> ValidationResult<&str> {
    if id.is_empty() {
        return Err(ValidationError::InvalidRecordId(
            "id must not be empty".to_string(),
        ));
    }

    if id.len() > MAX_RECORD_ID_LENGTH {
        return Err(ValidationError::InvalidRecordId(format!(
            "id must not exceed {MAX_RECORD_ID_LENGTH} characters"
        )));
    }

    if !RECORD_ID_REGEX.is_match(id) {
        return Err(ValidationError::InvalidRecordId(
            "id must contain only alphanumeric characters and hyphens".to_string(),
        ));
    }

    Ok(id)
}

/// Validate an optional rejection reason.
pub fn validate_reason(reason: Option<&str>) -> ValidationResult<()> {
    if let Some(reason) = reason {
        if reason.len() > MAX_REASON_LENGTH {
            return Err(ValidationError::InvalidReason(format!(
                "reason must not exceed {MAX_REASON_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Validate the free-form review payload.
///
/// The payload is persisted as-is, but it must be an object and any
/// `overallRating` it carries must be a non-negative number, since the
/// aggregation engine averages that field.
pub fn validate_review_payload(payload: &Value) -> ValidationResult<()> {
    let Some(obj) = payload.as_object() else {
        return Err(ValidationError::InvalidReviewPayload(
            "review payload must be a JSON object".to_string(),
        ));
    };

    if let Some(rating) = obj.get("overallRating") {
        match rating.as_f64() {
            Some(value) if value >= 0.0 => {},
            _ => {
                return Err(ValidationError::InvalidReviewPayload(
                    "overallRating must be a non-negative number".to_string(),
                ));
            },
        }
    }

    Ok(())
}

/// Validates a client event payload before dispatch.
pub fn validate_client_event(event: &ClientEvent) -> ValidationResult<()> {
    match event {
        ClientEvent::RequestDashboardData { manager_id, .. }
        | ClientEvent::RequestTeamAnalytics { manager_id, .. } => {
            if let Some(id) = manager_id {
                validate_record_id(id)?;
            }
        },
        ClientEvent::ApproveLeave {
            leave_id,
            rejection_reason,
            ..
        } => {
            validate_record_id(leave_id)?;
            validate_reason(rejection_reason.as_deref())?;
        },
        ClientEvent::CreatePerformanceReview {
            employee_id,
            review_data,
        } => {
            validate_record_id(employee_id)?;
            validate_review_payload(review_data)?;
        },
    }

    Ok(())
}
