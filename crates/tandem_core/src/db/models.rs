//! Database model wrappers
//!
//! These mirror the domain types but use `RecordId` and SurrealDB datetimes,
//! so the domain keeps typed ids and chrono timestamps.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::{DatabaseError, from_surreal_datetime};
use crate::{
    id::{FriendRequestId, UserId},
    models::{FriendRequest, FriendRequestStatus, User, UserProfile},
};

/// Database representation of a User
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbUser {
    pub id: RecordId,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub native_language: String,
    #[serde(default)]
    pub learning_language: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_onboarded: bool,
    #[serde(default)]
    pub friends: Vec<RecordId>,
    pub created_at: surrealdb::Datetime,
    pub updated_at: surrealdb::Datetime,
}

/// Database representation of a FriendRequest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbFriendRequest {
    pub id: RecordId,
    pub sender: RecordId,
    pub recipient: RecordId,
    pub status: FriendRequestStatus,
    pub created_at: surrealdb::Datetime,
    pub updated_at: surrealdb::Datetime,
}

/// A friend request row with the other party's record projected as `peer`
#[derive(Debug, Clone, Deserialize)]
pub struct DbFriendRequestWithPeer {
    pub id: RecordId,
    pub sender: RecordId,
    pub recipient: RecordId,
    pub status: FriendRequestStatus,
    pub created_at: surrealdb::Datetime,
    pub updated_at: surrealdb::Datetime,
    #[serde(default)]
    pub peer: Option<DbUser>,
}

/// Row shape of `SELECT count() AS total ... GROUP ALL`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CountRow {
    pub total: u64,
}

impl From<&User> for DbUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_record_id(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            bio: user.bio.clone(),
            profile_pic: user.profile_pic.clone(),
            native_language: user.native_language.clone(),
            learning_language: user.learning_language.clone(),
            location: user.location.clone(),
            is_onboarded: user.is_onboarded,
            friends: user.friends.iter().map(RecordId::from).collect(),
            created_at: user.created_at.into(),
            updated_at: user.updated_at.into(),
        }
    }
}

impl TryFrom<DbUser> for User {
    type Error = DatabaseError;

    fn try_from(db_user: DbUser) -> Result<Self, Self::Error> {
        let friends = db_user
            .friends
            .iter()
            .map(UserId::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: UserId::from_record(&db_user.id)?,
            created_at: from_surreal_datetime(&db_user.created_at)?,
            updated_at: from_surreal_datetime(&db_user.updated_at)?,
            full_name: db_user.full_name,
            email: db_user.email,
            password_hash: db_user.password_hash,
            bio: db_user.bio,
            profile_pic: db_user.profile_pic,
            native_language: db_user.native_language,
            learning_language: db_user.learning_language,
            location: db_user.location,
            is_onboarded: db_user.is_onboarded,
            friends,
        })
    }
}

impl From<&FriendRequest> for DbFriendRequest {
    fn from(request: &FriendRequest) -> Self {
        Self {
            id: request.id.to_record_id(),
            sender: request.sender.to_record_id(),
            recipient: request.recipient.to_record_id(),
            status: request.status,
            created_at: request.created_at.into(),
            updated_at: request.updated_at.into(),
        }
    }
}

impl TryFrom<DbFriendRequest> for FriendRequest {
    type Error = DatabaseError;

    fn try_from(db: DbFriendRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FriendRequestId::from_record(&db.id)?,
            sender: UserId::from_record(&db.sender)?,
            recipient: UserId::from_record(&db.recipient)?,
            status: db.status,
            created_at: from_surreal_datetime(&db.created_at)?,
            updated_at: from_surreal_datetime(&db.updated_at)?,
        })
    }
}

impl DbFriendRequestWithPeer {
    /// Split into the request and the projected peer, `None` if the peer
    /// record no longer exists
    pub fn into_parts(self) -> Result<Option<(FriendRequest, UserProfile)>, DatabaseError> {
        let request = FriendRequest::try_from(DbFriendRequest {
            id: self.id,
            sender: self.sender,
            recipient: self.recipient,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })?;

        match self.peer {
            Some(peer) => Ok(Some((request, User::try_from(peer)?.profile()))),
            None => Ok(None),
        }
    }
}
