//! Domain models for users and friend requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{FriendRequestId, UserId};

/// A registered user
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub bio: String,
    pub profile_pic: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub is_onboarded: bool,
    /// Friend ids, no duplicates
    pub friends: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_friend_of(&self, other: UserId) -> bool {
        self.friends.contains(&other)
    }

    /// Public projection safe to hand to other users
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            profile_pic: self.profile_pic.clone(),
            native_language: self.native_language.clone(),
            learning_language: self.learning_language.clone(),
            location: self.location.clone(),
            bio: self.bio.clone(),
        }
    }
}

/// Fields needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_pic: String,
}

/// Profile fields filled in during onboarding
#[derive(Debug, Clone, Default)]
pub struct OnboardingProfile {
    pub full_name: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub profile_pic: Option<String>,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub full_name: String,
    pub profile_pic: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub bio: String,
}

/// Lifecycle of a friend request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    #[default]
    Pending,
    Accepted,
}

impl FriendRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
        }
    }
}

/// A relationship proposal from `sender` to `recipient`
#[derive(Debug, Clone, PartialEq)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub sender: UserId,
    pub recipient: UserId,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::generate(),
            full_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "hash".to_string(),
            bio: "hola".to_string(),
            profile_pic: "pic.png".to_string(),
            native_language: "spanish".to_string(),
            learning_language: "english".to_string(),
            location: "Madrid".to_string(),
            is_onboarded: true,
            friends: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_profile_hides_credentials() {
        let u = user();
        let json = serde_json::to_value(u.profile()).unwrap();
        assert_eq!(json["_id"], u.id.to_string());
        assert_eq!(json["fullName"], "Ana");
        assert_eq!(json["nativeLanguage"], "spanish");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(FriendRequestStatus::Accepted).unwrap(),
            "accepted"
        );
        assert_eq!(FriendRequestStatus::default().as_str(), "pending");
    }
}
