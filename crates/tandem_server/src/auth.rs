//! Authentication utilities

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tandem_core::UserId;

use crate::error::ServerResult;

/// Shortest password accepted at signup
pub const MIN_PASSWORD_LEN: usize = 6;

/// Number of stock avatars the avatar service serves
pub const AVATAR_COUNT: u32 = 100;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
    pub jti: uuid::Uuid,
}

/// Hash a plaintext password
pub fn hash_password(password: &str) -> ServerResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> ServerResult<bool> {
    let parsed_hash = PasswordHash::new(hash)?;
    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a session token
pub fn generate_access_token(
    user_id: UserId,
    encoding_key: &EncodingKey,
    ttl_seconds: u64,
) -> ServerResult<String> {
    let now = chrono::Utc::now().timestamp();

    let claims = AccessTokenClaims {
        sub: user_id,
        iat: now,
        exp: now + ttl_seconds as i64,
        jti: uuid::Uuid::new_v4(),
    };

    Ok(encode(&Header::default(), &claims, encoding_key)?)
}

/// Validate a session token
pub fn validate_access_token(
    token: &str,
    decoding_key: &DecodingKey,
) -> ServerResult<AccessTokenClaims> {
    let token_data = decode::<AccessTokenClaims>(token, decoding_key, &Validation::default())?;
    Ok(token_data.claims)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// One of the stock avatars, picked at random
pub fn random_avatar() -> String {
    let idx = rand::thread_rng().gen_range(1..=AVATAR_COUNT);
    format!("https://avatar.iran.liara.run/public/{idx}.png")
}
