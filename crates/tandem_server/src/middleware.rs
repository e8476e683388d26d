//! Middleware for authentication

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tandem_api::ApiError;
use tandem_core::User;

use crate::{config::ServerConfig, state::AppState};

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "jwt";

/// The authenticated user, inserted into request extensions by [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Session token from the bearer header, falling back to the cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer_token(headers)
        .map(str::to_string)
        .or_else(|| {
            CookieJar::from_headers(headers)
                .get(AUTH_COOKIE)
                .map(|c| c.value().to_string())
        })
        .filter(|token| !token.is_empty())
}

/// HTTP-only session cookie carrying `token`
pub fn session_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure_cookies)
        .max_age(time::Duration::seconds(config.access_token_ttl as i64))
        .build()
}

/// Expired, empty session cookie that makes the browser drop the session
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(AUTH_COOKIE).path("/").http_only(true).build();
    cookie.make_removal();
    cookie
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized - No token provided"))?;

    // Validate token
    let claims = crate::auth::validate_access_token(&token, &state.jwt_decoding_key)
        .map_err(|_| ApiError::unauthorized("Unauthorized - Invalid token"))?;

    let user = state
        .store
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized - User not found"))?;

    // Insert the user into request extensions for handlers to use
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
