//! Chat provider integration
//!
//! Messaging itself happens client-side against Stream; the server only keeps
//! Stream's user directory in sync and mints per-user tokens.

use std::collections::HashMap;

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::Client;
use serde::Serialize;
use tandem_core::User;
use tracing::debug;

use crate::config::StreamConfig;

/// Default Stream chat REST endpoint
pub const STREAM_BASE_URL: &str = "https://chat.stream-io-api.com";

/// A user as the chat provider knows them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatUser {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl From<&User> for ChatUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.full_name.clone(),
            image: user.profile_pic.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ChatError {
    #[error("Chat provider credentials are not configured")]
    #[diagnostic(
        code(chat::not_configured),
        help("Set STREAM_API_KEY and STREAM_API_SECRET")
    )]
    NotConfigured,

    #[error("Failed to sign chat token: {0}")]
    #[diagnostic(code(chat::token))]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Chat provider request failed: {0}")]
    #[diagnostic(code(chat::http))]
    Http(#[from] reqwest::Error),

    #[error("Chat provider returned {status}: {body}")]
    #[diagnostic(code(chat::upstream))]
    Upstream { status: u16, body: String },
}

/// The slice of a chat service the API depends on
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Create or update users in one batch
    async fn upsert_users(&self, users: &[ChatUser]) -> Result<(), ChatError>;

    /// Token the client uses to connect as `user_id`
    fn user_token(&self, user_id: &str) -> Result<String, ChatError>;
}

#[derive(Serialize)]
struct UserTokenClaims<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct ServerTokenClaims {
    server: bool,
}

#[derive(Serialize)]
struct UpsertUsersBody<'a> {
    users: HashMap<&'a str, &'a ChatUser>,
}

struct StreamCredentials {
    api_key: String,
    signing_key: EncodingKey,
}

/// Stream chat REST client
pub struct StreamClient {
    credentials: Option<StreamCredentials>,
    base_url: String,
    http_client: Client,
}

impl StreamClient {
    pub fn new(config: &StreamConfig) -> Self {
        let credentials = match (&config.api_key, &config.api_secret) {
            (Some(key), Some(secret)) if config.is_configured() => Some(StreamCredentials {
                api_key: key.clone(),
                signing_key: EncodingKey::from_secret(secret.as_bytes()),
            }),
            _ => None,
        };

        Self {
            credentials,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| STREAM_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            http_client: Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&StreamCredentials, ChatError> {
        self.credentials.as_ref().ok_or(ChatError::NotConfigured)
    }

    fn server_token(&self) -> Result<String, ChatError> {
        let creds = self.credentials()?;
        Ok(encode(
            &Header::default(),
            &ServerTokenClaims { server: true },
            &creds.signing_key,
        )?)
    }
}

#[async_trait]
impl ChatProvider for StreamClient {
    async fn upsert_users(&self, users: &[ChatUser]) -> Result<(), ChatError> {
        if users.is_empty() {
            return Ok(());
        }

        let creds = self.credentials()?;
        let body = UpsertUsersBody {
            users: users.iter().map(|u| (u.id.as_str(), u)).collect(),
        };

        debug!(count = users.len(), "Upserting chat users");

        let response = self
            .http_client
            .post(format!("{}/users", self.base_url))
            .query(&[("api_key", creds.api_key.as_str())])
            .header("Authorization", self.server_token()?)
            .header("stream-auth-type", "jwt")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    fn user_token(&self, user_id: &str) -> Result<String, ChatError> {
        let creds = self.credentials()?;
        Ok(encode(
            &Header::default(),
            &UserTokenClaims { user_id },
            &creds.signing_key,
        )?)
    }
}
