//! Server configuration
//!
//! Resolved in three layers: built-in defaults, an optional TOML file, then
//! environment variables (a `.env` file is loaded by the binary first).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Signing secret used when none is configured; only fit for local development
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (e.g., "127.0.0.1:5001")
    pub bind_address: String,

    /// Database URL (`mem://`, `surrealkv://path`, `ws://host:port`)
    pub database_url: String,
    pub namespace: String,
    pub database: String,

    /// JWT secret for signing session tokens
    pub jwt_secret: String,

    /// Session lifetime in seconds
    pub access_token_ttl: u64,

    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,

    /// CORS configuration
    pub cors: CorsConfig,

    /// Stream chat credentials
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Browser origins allowed to call the API with credentials; `*` allows
    /// any origin without credentials
    pub allowed_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Override for the Stream REST endpoint
    pub base_url: Option<String>,
}

impl StreamConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.api_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5001".to_string(),
            database_url: "mem://".to_string(),
            namespace: "tandem".to_string(),
            database: "main".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_ttl: 7 * 24 * 60 * 60, // 7 days
            secure_cookies: false,
            cors: CorsConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            max_age: 3600,
        }
    }
}

impl ServerConfig {
    /// Defaults, then the TOML file at `path` if given, then the process
    /// environment
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };

        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            ServerError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Reject settings that would let anyone forge a session
    ///
    /// The default signing secret is tolerated in development with an
    /// error-level log, and refused once cookies are marked `Secure`.
    pub fn validate(&self) -> ServerResult<()> {
        if self.jwt_secret.is_empty() {
            return Err(ServerError::Config("JWT secret must not be empty".to_string()));
        }

        if self.uses_default_jwt_secret() {
            if self.secure_cookies {
                return Err(ServerError::Config(
                    "JWT_SECRET_KEY must be set in production".to_string(),
                ));
            }
            tracing::error!("JWT_SECRET_KEY is not set; session tokens can be forged");
        }

        Ok(())
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Apply environment overrides from `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = lookup("PORT") {
            self.bind_address = format!("0.0.0.0:{port}");
        }
        if let Some(addr) = lookup("BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET_KEY") {
            self.jwt_secret = secret;
        }
        if let Some(key) = lookup("STREAM_API_KEY") {
            self.stream.api_key = Some(key);
        }
        if let Some(secret) = lookup("STREAM_API_SECRET") {
            self.stream.api_secret = Some(secret);
        }
        if let Some(origin) = lookup("CLIENT_URL") {
            self.cors.allowed_origins = origin
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if lookup("NODE_ENV").as_deref() == Some("production") {
            self.secure_cookies = true;
        }
        self
    }
}
