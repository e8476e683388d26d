//! Chat provider handlers

use axum::{
    Extension,
    extract::{Json, State},
};
use tandem_api::{
    ApiError,
    requests::{EnsureChatUsersRequest, is_blank},
    responses::{ChatTokenResponse, SuccessResponse},
};
use tandem_core::UserId;

use crate::{chat::ChatUser, extract::JsonBody, middleware::CurrentUser, state::AppState};

/// Refresh the user's chat identity and hand back a chat token
pub async fn chat_token(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
) -> Result<Json<ChatTokenResponse>, ApiError> {
    state.chat.upsert_users(&[ChatUser::from(&me)]).await?;
    let token = state.chat.user_token(&me.id.to_string())?;

    Ok(Json(ChatTokenResponse { token }))
}

/// Make sure both sides of a conversation exist in the chat provider
pub async fn ensure_chat_users(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    JsonBody(request): JsonBody<EnsureChatUsersRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let target = match request.target_user_id {
        Some(id) if !is_blank(Some(id.as_str())) => id,
        _ => return Err(ApiError::validation("Target user ID is required")),
    };
    let target: UserId = target.trim().parse()?;

    // Re-read the caller too so the provider gets the stored profile
    let (current, target) = tokio::try_join!(
        state.store.get_user(me.id),
        state.store.get_user(target),
    )?;

    let (Some(current), Some(target)) = (current, target) else {
        return Err(ApiError::not_found("User not found"));
    };

    state
        .chat
        .upsert_users(&[ChatUser::from(&current), ChatUser::from(&target)])
        .await?;

    Ok(Json(SuccessResponse::ok("Users ensured in Stream")))
}
