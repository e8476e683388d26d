//! API error types

use miette::{Diagnostic, JSONReportHandler};
use serde::{Deserialize, Serialize};

/// Message clients see for any failure they can't act on
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// API error response
#[derive(Debug, thiserror::Error, Diagnostic, Serialize, Deserialize)]
pub enum ApiError {
    /// Request validation failed
    #[error("{message}")]
    #[diagnostic(
        code(api::validation_error),
        help("Check the request body and path parameters")
    )]
    ValidationError {
        message: String,
        missing_fields: Option<Vec<String>>,
    },

    /// Authentication required
    #[error("{message}")]
    #[diagnostic(
        code(api::unauthorized),
        help("Please provide valid authentication credentials")
    )]
    Unauthorized { message: String },

    /// Authenticated, but not allowed to touch this resource
    #[error("{message}")]
    #[diagnostic(code(api::forbidden))]
    Forbidden { message: String },

    /// Resource not found
    #[error("{message}")]
    #[diagnostic(code(api::not_found))]
    NotFound { message: String },

    /// Database error from tandem-core
    #[error("{message}")]
    #[diagnostic(code(api::database_error), help("Database operation failed"))]
    Database { message: String, json: String },

    /// Any other failure on our side
    #[error("{message}")]
    #[diagnostic(code(api::internal_error))]
    Internal { message: String },
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized { .. } => 401,
            ApiError::Forbidden { .. } => 403,
            ApiError::NotFound { .. } => 404,
            ApiError::Database { .. } => 500,
            ApiError::Internal { .. } => 500,
        }
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "validation_error",
            ApiError::Unauthorized { .. } => "unauthorized",
            ApiError::Forbidden { .. } => "forbidden",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Database { .. } => "database_error",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    /// Whether the error is our fault and its details must stay server-side
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            missing_fields: None,
        }
    }

    /// Create a validation error listing the fields that were absent
    pub fn missing_fields(message: impl Into<String>, fields: Vec<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            missing_fields: Some(fields),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Message safe to send to clients
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

// Conversion implementations
impl From<tandem_core::DatabaseError> for ApiError {
    fn from(err: tandem_core::DatabaseError) -> Self {
        let handler = JSONReportHandler::new();

        let message = format!("{}", err);
        let mut json = String::new();

        let err: Box<dyn Diagnostic> = Box::new(err);
        handler
            .render_report(&mut json, err.as_ref())
            .unwrap_or_default();

        Self::Database { message, json }
    }
}

impl From<tandem_core::IdError> for ApiError {
    fn from(err: tandem_core::IdError) -> Self {
        Self::validation(format!("Invalid id: {err}"))
    }
}

/// Unreadable or malformed request bodies are client errors
#[cfg(feature = "server")]
impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

// Server-side response conversion
#[cfg(feature = "server")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self {
            ApiError::Database { message, json } => {
                tracing::error!(detail = %json, "Database error: {}", message);
            }
            ApiError::Internal { message } => tracing::error!("Internal error: {}", message),
            _ => tracing::debug!(status = status.as_u16(), "Request rejected: {}", self),
        }

        let mut body = serde_json::json!({
            "message": self.public_message(),
            "type": self.kind(),
            "timestamp": chrono::Utc::now(),
        });

        if let ApiError::ValidationError {
            missing_fields: Some(fields),
            ..
        } = &self
        {
            body["missingFields"] = serde_json::json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::validation("bad").status_code(), 400);
        assert_eq!(ApiError::unauthorized("no").status_code(), 401);
        assert_eq!(ApiError::forbidden("no").status_code(), 403);
        assert_eq!(ApiError::not_found("gone").status_code(), 404);
        assert_eq!(ApiError::internal("boom").status_code(), 500);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::internal("stream secret rejected");
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);

        let err = ApiError::not_found("Recipient not found");
        assert_eq!(err.public_message(), "Recipient not found");
    }

    #[test]
    fn test_database_error_conversion() {
        let err = ApiError::from(tandem_core::DatabaseError::NotFound {
            entity: "user".to_string(),
        });
        assert!(matches!(err, ApiError::Database { .. }));
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
    }
}
