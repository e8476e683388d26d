//! Server error types

use axum::response::{IntoResponse, Response};
use tandem_api::ApiError;

use crate::chat::ChatError;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] tandem_core::DatabaseError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Chat provider error: {0}")]
    Chat(#[from] ChatError),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    Argon2(#[from] argon2::password_hash::Error),

    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Database(e) => ApiError::from(e),
            ServerError::Api(e) => e,
            ServerError::Chat(e) => ApiError::from(e),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        ApiError::internal(format!("Chat provider error: {err}"))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // Convert to ApiError for consistent error responses
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_mapping() {
        let api = ApiError::from(ServerError::Config("bad".to_string()));
        assert_eq!(api.status_code(), 500);

        let api = ApiError::from(ServerError::Chat(ChatError::NotConfigured));
        assert_eq!(api.status_code(), 500);

        let api = ApiError::from(ServerError::Api(ApiError::not_found("User not found")));
        assert_eq!(api.status_code(), 404);
    }

    #[test]
    fn test_token_signing_failure_is_internal() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidRsaKey("bad key".to_string()),
        );
        let api = ApiError::from(ServerError::Jwt(err));
        assert_eq!(api.status_code(), 500);
        assert_eq!(api.public_message(), tandem_api::error::INTERNAL_ERROR_MESSAGE);
    }
}
