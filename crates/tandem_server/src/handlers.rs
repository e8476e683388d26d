//! HTTP request handlers

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

pub mod auth;
pub mod chat;
pub mod health;
pub mod users;

use crate::{middleware::require_auth, state::AppState};

/// Build all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    use tandem_api::requests::*;

    let public = Router::new()
        // Health check
        .route(HealthCheckRequest::PATH, get(health::health_check))
        // Session endpoints
        .route(SignupRequest::PATH, post(auth::signup))
        .route(LoginRequest::PATH, post(auth::login))
        .route(LogoutRequest::PATH, post(auth::logout));

    let protected = Router::new()
        .route(OnboardingRequest::PATH, post(auth::onboard))
        .route(MeRequest::PATH, get(auth::me))
        // Social graph
        .route(RecommendedUsersRequest::PATH, get(users::recommended_users))
        .route(FriendsRequest::PATH, get(users::my_friends))
        .route(SendFriendRequest::PATH, post(users::send_friend_request))
        .route(AcceptFriendRequest::PATH, put(users::accept_friend_request))
        .route(FriendRequestsRequest::PATH, get(users::friend_requests))
        .route(
            OutgoingFriendRequestsRequest::PATH,
            get(users::outgoing_friend_requests),
        )
        // Chat
        .route(ChatTokenRequest::PATH, get(chat::chat_token))
        .route(EnsureChatUsersRequest::PATH, post(chat::ensure_chat_users))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}
