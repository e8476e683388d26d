//! API request types
//!
//! Body fields are optional at the type level so handlers can answer a
//! missing field with a specific 400 instead of a generic parse failure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tandem_core::PageRequest;

/// Marker trait for request types with the route they are served on
pub trait ApiEndpoint {
    const PATH: &'static str;
}

/// Account creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl ApiEndpoint for SignupRequest {
    const PATH: &'static str = "/auth/signup";
}

/// Login with email/password
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl ApiEndpoint for LoginRequest {
    const PATH: &'static str = "/auth/login";
}

/// Clear the session cookie
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LogoutRequest;

impl ApiEndpoint for LogoutRequest {
    const PATH: &'static str = "/auth/logout";
}

/// Profile submitted at the end of onboarding
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub native_language: Option<String>,
    pub learning_language: Option<String>,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl ApiEndpoint for OnboardingRequest {
    const PATH: &'static str = "/auth/onboarding";
}

impl OnboardingRequest {
    /// Names of the required fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<String> {
        [
            ("fullName", &self.full_name),
            ("bio", &self.bio),
            ("nativeLanguage", &self.native_language),
            ("learningLanguage", &self.learning_language),
            ("location", &self.location),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value.as_deref()))
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

/// Current session's user
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MeRequest;

impl ApiEndpoint for MeRequest {
    const PATH: &'static str = "/auth/me";
}

/// Lenient `?page=&limit=` query
///
/// Values stay raw strings so garbage falls back to defaults rather than
/// rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn to_page_request(&self) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Recommended peers
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecommendedUsersRequest;

impl ApiEndpoint for RecommendedUsersRequest {
    const PATH: &'static str = "/users";
}

/// Current user's friends
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FriendsRequest;

impl ApiEndpoint for FriendsRequest {
    const PATH: &'static str = "/users/friends";
}

/// Send a friend request to the user in the path
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SendFriendRequest;

impl ApiEndpoint for SendFriendRequest {
    const PATH: &'static str = "/users/friend-request/:id";
}

/// Accept the friend request in the path
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AcceptFriendRequest;

impl ApiEndpoint for AcceptFriendRequest {
    const PATH: &'static str = "/users/friend-request/:id/accept";
}

/// Incoming pending and accepted-outgoing requests
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FriendRequestsRequest;

impl ApiEndpoint for FriendRequestsRequest {
    const PATH: &'static str = "/users/friend-requests";
}

/// Pending requests the current user sent
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OutgoingFriendRequestsRequest;

impl ApiEndpoint for OutgoingFriendRequestsRequest {
    const PATH: &'static str = "/users/outgoing-friend-requests";
}

/// Chat token for the current user
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ChatTokenRequest;

impl ApiEndpoint for ChatTokenRequest {
    const PATH: &'static str = "/chat/token";
}

/// Make sure both chat participants exist in the chat provider
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnsureChatUsersRequest {
    pub target_user_id: Option<String>,
}

impl ApiEndpoint for EnsureChatUsersRequest {
    const PATH: &'static str = "/chat/ensure-users";
}

/// Health check request
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HealthCheckRequest;

impl ApiEndpoint for HealthCheckRequest {
    const PATH: &'static str = "/health";
}

/// `None`, empty and whitespace-only all count as missing
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
