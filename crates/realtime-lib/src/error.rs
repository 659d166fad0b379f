// crates/realtime-lib/src/error.rs

//! Central error type + Axum integration.
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hrms_common::ServerEvent;
use thiserror::Error;

/// Application error taxonomy.
///
/// Only `Authentication` terminates a connection attempt (the upgrade is
/// refused); every other variant is caught at the handler boundary and
/// converted into a single `error` event for the requester.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Access denied: {0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upstream store error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// HTTP status used when refusing a connection attempt before upgrade.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Internal(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Short machine-readable code for logs and response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "AUTH_001",
            AppError::Authorization(_) => "AUTHZ_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Validation(_) => "VAL_001",
            AppError::Upstream(_) => "UP_001",
            AppError::Internal(_) => "INT_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Convert into the single `error` event delivered to the requester.
    pub fn to_event(&self) -> ServerEvent {
        match self {
            AppError::Authorization(_) => ServerEvent::Error {
                message: "Access denied".to_string(),
                error: None,
            },
            AppError::NotFound(what) => ServerEvent::Error {
                message: what.clone(),
                error: None,
            },
            AppError::Validation(err) => ServerEvent::Error {
                message: "Invalid request payload".to_string(),
                error: Some(err.to_string()),
            },
            other => ServerEvent::Error {
                message: "Request failed".to_string(),
                error: Some(other.to_string()),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AppError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        AppError::Internal("Failed to send message".to_string())
    }
}
