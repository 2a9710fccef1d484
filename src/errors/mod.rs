//! Error handling module for the club site backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNSUPPORTED_TYPE: &str = "UNSUPPORTED_TYPE";
    pub const TOO_LARGE: &str = "TOO_LARGE";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const STORE_CORRUPT: &str = "STORE_CORRUPT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Admin route reached without a valid session
    #[error("{0}")]
    Unauthorized(String),
    /// Unknown event id or collection index
    #[error("{0}")]
    NotFound(String),
    /// Missing or invalid required fields
    #[error("{message}")]
    Validation {
        message: String,
        missing: Vec<String>,
    },
    /// Upload with an extension outside the allow-list
    #[error("{0}")]
    UnsupportedType(String),
    /// Upload above the size limit
    #[error("File too large. Maximum size is {limit} bytes")]
    TooLarge { limit: u64 },
    /// Malformed request
    #[error("{0}")]
    BadRequest(String),
    /// JSON document missing or unreadable; needs an operator
    #[error("{0}")]
    StoreCorrupt(String),
    /// I/O or other unexpected failure
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Validation error for a set of missing required fields.
    pub fn missing_fields(missing: Vec<String>) -> Self {
        AppError::Validation {
            message: format!("Missing required fields: {}", missing.join(", ")),
            missing,
        }
    }

    /// Validation error that is not about a specific field.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            missing: Vec::new(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::StoreCorrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation { .. } => codes::VALIDATION_ERROR,
            AppError::UnsupportedType(_) => codes::UNSUPPORTED_TYPE,
            AppError::TooLarge { .. } => codes::TOO_LARGE,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::StoreCorrupt(_) => codes::STORE_CORRUPT,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Whether the error can be shown to the admin as a message instead of an error page.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_)
                | AppError::Validation { .. }
                | AppError::UnsupportedType(_)
                | AppError::TooLarge { .. }
                | AppError::BadRequest(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {:?}", err);
        AppError::Internal(format!("I/O error: {}", err))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!("Multipart error: {:?}", err);
        AppError::BadRequest(format!("Invalid multipart request: {}", err.body_text()))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let missing = match error {
            AppError::Validation { missing, .. } if !missing.is_empty() => Some(missing.clone()),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.to_string(),
            },
            missing,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::StoreCorrupt(msg) = &self {
            tracing::error!("Data store needs manual repair: {}", msg);
        }
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_envelope_lists_missing_fields() {
        let err = AppError::missing_fields(vec!["name".to_string(), "date".to_string()]);
        let body = serde_json::to_value(ErrorResponse::new(&err)).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], codes::VALIDATION_ERROR);
        assert_eq!(body["missing"], serde_json::json!(["name", "date"]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_validation_envelope_has_no_missing_key() {
        let body = serde_json::to_value(ErrorResponse::new(&AppError::NotFound(
            "Event 9 not found".to_string(),
        )))
        .unwrap();

        assert!(body.get("missing").is_none());
        assert_eq!(body["error"]["message"], "Event 9 not found");
    }

    #[test]
    fn test_upload_rejections_map_to_distinct_statuses() {
        assert_eq!(
            AppError::UnsupportedType("exe".to_string()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::TooLarge { limit: 1 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert!(!AppError::StoreCorrupt("bad".to_string()).is_recoverable());
    }
}
