//! Account and session handlers

use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use tandem_api::{
    ApiError,
    requests::{LoginRequest, OnboardingRequest, SignupRequest, is_blank},
    responses::{AuthResponse, SuccessResponse, UserEnvelope, UserResponse},
};
use tandem_core::{NewUser, OnboardingProfile, User};
use tracing::{error, info};

use crate::{
    auth::{
        MIN_PASSWORD_LEN, generate_access_token, hash_password, is_valid_email, random_avatar,
        verify_password,
    },
    chat::ChatUser,
    extract::JsonBody,
    middleware::{CurrentUser, removal_cookie, session_cookie},
    state::AppState,
};

/// Create an account and start a session
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(request): JsonBody<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let (Some(full_name), Some(email), Some(password)) =
        (request.full_name, request.email, request.password)
    else {
        return Err(ApiError::validation("All fields are required"));
    };
    if [&full_name, &email, &password]
        .iter()
        .any(|v| is_blank(Some(v.as_str())))
    {
        return Err(ApiError::validation("All fields are required"));
    }

    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let email = email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(ApiError::validation("Invalid email format"));
    }

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::validation(
            "Email already exists, please use a different one",
        ));
    }

    let password_hash = hash_password(&password)?;
    let user = state
        .store
        .create_user(NewUser {
            full_name: full_name.trim().to_string(),
            email,
            password_hash,
            profile_pic: random_avatar(),
        })
        .await?;

    info!("Created user {}", user.id);
    sync_chat_user(&state, &user, "signup").await;

    let token = generate_access_token(
        user.id,
        &state.jwt_encoding_key,
        state.config.access_token_ttl,
    )?;
    let jar = jar.add(session_cookie(token.clone(), &state.config));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            success: true,
            user: UserResponse::from(&user),
            token,
        }),
    ))
}

/// Start a session with email and password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::validation("All fields are required"));
    };
    if is_blank(Some(email.as_str())) || password.is_empty() {
        return Err(ApiError::validation("All fields are required"));
    }

    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = generate_access_token(
        user.id,
        &state.jwt_encoding_key,
        state.config.access_token_ttl,
    )?;
    let jar = jar.add(session_cookie(token.clone(), &state.config));

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: UserResponse::from(&user),
            token,
        }),
    ))
}

/// Clear the session cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    (
        jar.add(removal_cookie()),
        Json(SuccessResponse::ok("Logout successful")),
    )
}

/// Fill in the learner profile and mark the account onboarded
pub async fn onboard(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    JsonBody(request): JsonBody<OnboardingRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::missing_fields("All fields are required", missing));
    }

    let field = |value: Option<String>| value.unwrap_or_default().trim().to_string();
    let profile = OnboardingProfile {
        full_name: field(request.full_name),
        bio: field(request.bio),
        native_language: field(request.native_language),
        learning_language: field(request.learning_language),
        location: field(request.location),
        profile_pic: request.profile_pic.filter(|p| !p.trim().is_empty()),
    };

    let updated = state
        .store
        .complete_onboarding(user.id, profile)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    sync_chat_user(&state, &updated, "onboarding").await;

    Ok(Json(UserEnvelope {
        success: true,
        user: UserResponse::from(&updated),
    }))
}

/// The authenticated user
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserEnvelope> {
    Json(UserEnvelope {
        success: true,
        user: UserResponse::from(&user),
    })
}

/// Push the user's chat identity; failures are logged, never surfaced
async fn sync_chat_user(state: &AppState, user: &User, during: &str) {
    if let Err(e) = state.chat.upsert_users(&[ChatUser::from(user)]).await {
        error!(user = %user.id, "Error syncing chat user during {}: {}", during, e);
    }
}
