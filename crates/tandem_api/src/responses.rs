//! API response types

use std::marker::PhantomData;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tandem_core::{
    FriendRequest, FriendRequestId, FriendRequestStatus, PageInfo, User, UserId, UserProfile,
};

/// The authenticated user's own view of their account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub bio: String,
    pub profile_pic: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub is_onboarded: bool,
    pub friends: Vec<UserId>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            profile_pic: user.profile_pic.clone(),
            native_language: user.native_language.clone(),
            learning_language: user.learning_language.clone(),
            location: user.location.clone(),
            is_onboarded: user.is_onboarded,
            friends: user.friends.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Signup/login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
    /// Access token, also set as the `jwt` cookie
    pub token: String,
}

/// `{success, user}` envelope for onboarding and `/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub success: bool,
    pub user: UserResponse,
}

/// Plain `{message}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{success, message}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Either a bare user id or the populated public profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Profile(UserProfile),
    Id(UserId),
}

/// A friend request as sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    #[serde(rename = "_id")]
    pub id: FriendRequestId,
    pub sender: UserRef,
    pub recipient: UserRef,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestResponse {
    fn build(request: &FriendRequest, sender: UserRef, recipient: UserRef) -> Self {
        Self {
            id: request.id,
            sender,
            recipient,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }

    /// Sender populated, recipient as an id
    pub fn with_sender(request: &FriendRequest, sender: UserProfile) -> Self {
        Self::build(
            request,
            UserRef::Profile(sender),
            UserRef::Id(request.recipient),
        )
    }

    /// Recipient populated, sender as an id
    pub fn with_recipient(request: &FriendRequest, recipient: UserProfile) -> Self {
        Self::build(
            request,
            UserRef::Id(request.sender),
            UserRef::Profile(recipient),
        )
    }
}

impl From<&FriendRequest> for FriendRequestResponse {
    fn from(request: &FriendRequest) -> Self {
        Self::build(
            request,
            UserRef::Id(request.sender),
            UserRef::Id(request.recipient),
        )
    }
}

/// Names the total-count key of a pagination block
pub trait TotalKey {
    const KEY: &'static str;
}

/// `totalUsers`
#[derive(Debug, Clone, Copy)]
pub struct TotalUsers;
/// `totalFriends`
#[derive(Debug, Clone, Copy)]
pub struct TotalFriends;
/// `totalRequests`
#[derive(Debug, Clone, Copy)]
pub struct TotalRequests;

impl TotalKey for TotalUsers {
    const KEY: &'static str = "totalUsers";
}
impl TotalKey for TotalFriends {
    const KEY: &'static str = "totalFriends";
}
impl TotalKey for TotalRequests {
    const KEY: &'static str = "totalRequests";
}

/// Pagination block; the total is serialized under `K::KEY`
#[derive(Debug, Clone, Copy)]
pub struct Pagination<K> {
    pub info: PageInfo,
    _key: PhantomData<K>,
}

impl<K: TotalKey> Pagination<K> {
    pub fn new(info: PageInfo) -> Self {
        Self {
            info,
            _key: PhantomData,
        }
    }
}

impl<K: TotalKey> Serialize for Pagination<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Pagination", 5)?;
        state.serialize_field("currentPage", &self.info.current_page)?;
        state.serialize_field("totalPages", &self.info.total_pages)?;
        state.serialize_field(K::KEY, &self.info.total)?;
        state.serialize_field("hasNextPage", &self.info.has_next_page)?;
        state.serialize_field("hasPrevPage", &self.info.has_prev_page)?;
        state.end()
    }
}

/// `GET /users`
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedUsersResponse {
    pub users: Vec<UserProfile>,
    pub pagination: Pagination<TotalUsers>,
}

/// `GET /users/friends`
#[derive(Debug, Clone, Serialize)]
pub struct FriendsResponse {
    pub friends: Vec<UserProfile>,
    pub pagination: Pagination<TotalFriends>,
}

/// One page of friend requests
#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestPage {
    pub requests: Vec<FriendRequestResponse>,
    pub pagination: Pagination<TotalRequests>,
}

/// `GET /users/friend-requests`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestsResponse {
    pub incoming_reqs: FriendRequestPage,
    pub accepted_reqs: FriendRequestPage,
}

/// `GET /chat/token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTokenResponse {
    pub token: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub database_status: ComponentStatus,
}

/// Overall health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Component status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Ok,
    Error,
}
