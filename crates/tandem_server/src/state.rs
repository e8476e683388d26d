//! Application state

use std::sync::Arc;

use tandem_core::Store;

use crate::{
    chat::{ChatProvider, StreamClient},
    config::ServerConfig,
    error::ServerResult,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Store,
    pub chat: Arc<dyn ChatProvider>,
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,
}

impl AppState {
    /// Connect to the configured database and chat provider
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let store = Store::connect(&config.database_url, &config.namespace, &config.database).await?;

        let stream = StreamClient::new(&config.stream);
        if !stream.is_configured() {
            tracing::warn!("Stream credentials missing; chat sync and tokens will fail");
        }

        Ok(Self::with_parts(config, store, Arc::new(stream)))
    }

    /// Assemble state from already-built parts
    pub fn with_parts(config: ServerConfig, store: Store, chat: Arc<dyn ChatProvider>) -> Self {
        // Create JWT keys
        let jwt_encoding_key = jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let jwt_decoding_key = jsonwebtoken::DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            config: Arc::new(config),
            store,
            chat,
            jwt_encoding_key,
            jwt_decoding_key,
        }
    }
}
