//! Database operations - direct, simple, no unnecessary abstractions

use surrealdb::{RecordId, Surreal, engine::any::Any};

use super::{
    DatabaseError, Result,
    models::{CountRow, DbFriendRequest, DbFriendRequestWithPeer, DbUser},
};
use crate::{
    id::{FriendRequestId, FriendRequestIdType, IdType, UserId, UserIdType},
    models::{
        FriendRequest, FriendRequestStatus, NewUser, OnboardingProfile, User, UserProfile,
    },
    pagination::PageRequest,
};

/// Filter selecting users another user could be matched with
const RECOMMENDED_FILTER: &str = "id != $me AND id NOTINSIDE $friends AND is_onboarded = true";

/// Which side of a friend request the current user is on, and which state
/// the listing wants
#[derive(Debug, Clone, Copy)]
enum RequestListing {
    /// Pending requests addressed to the user, newest first
    Incoming,
    /// Requests the user sent that were accepted, most recently accepted first
    Accepted,
    /// Pending requests the user sent, newest first
    Outgoing,
}

impl RequestListing {
    /// (own side, peer side, status, sort field)
    fn parts(self) -> (&'static str, &'static str, FriendRequestStatus, &'static str) {
        match self {
            RequestListing::Incoming => (
                "recipient",
                "sender",
                FriendRequestStatus::Pending,
                "created_at",
            ),
            RequestListing::Accepted => (
                "sender",
                "recipient",
                FriendRequestStatus::Accepted,
                "updated_at",
            ),
            RequestListing::Outgoing => (
                "sender",
                "recipient",
                FriendRequestStatus::Pending,
                "created_at",
            ),
        }
    }
}

/// Handle to the users/friend-requests database
#[derive(Clone)]
pub struct Store {
    db: Surreal<Any>,
}

impl Store {
    /// Wrap an already-migrated connection
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    /// Connect and migrate
    pub async fn connect(url: &str, namespace: &str, database: &str) -> Result<Self> {
        Ok(Self::new(super::connect(url, namespace, database).await?))
    }

    /// Fresh in-memory database, used by tests
    pub async fn in_memory() -> Result<Self> {
        Self::connect("memory", "tandem", "test").await
    }

    /// Cheap liveness check
    pub async fn health_check(&self) -> Result<()> {
        self.db
            .query("RETURN true")
            .await
            .and_then(|response| response.check())
            .map_err(DatabaseError::QueryFailed)?;
        Ok(())
    }

    // ===== User Operations =====

    /// Create a new, not yet onboarded user
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let now = chrono::Utc::now();
        let user = User {
            id: UserId::generate(),
            full_name: new_user.full_name,
            email: normalize_email(&new_user.email),
            password_hash: new_user.password_hash,
            bio: String::new(),
            profile_pic: new_user.profile_pic,
            native_language: String::new(),
            learning_language: String::new(),
            location: String::new(),
            is_onboarded: false,
            friends: vec![],
            created_at: now,
            updated_at: now,
        };

        let created: Option<DbUser> = self
            .db
            .create(UserIdType::PREFIX)
            .content(DbUser::from(&user))
            .await
            .map_err(DatabaseError::QueryFailed)?;

        created
            .ok_or_else(|| DatabaseError::Other("Failed to create user".into()))?
            .try_into()
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let db_user: Option<DbUser> = self
            .db
            .select((UserIdType::PREFIX, id.uuid().to_string()))
            .await
            .map_err(DatabaseError::QueryFailed)?;

        db_user.map(User::try_from).transpose()
    }

    /// Look a user up by email, case-insensitively
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let db_user: Option<DbUser> = self
            .db
            .query("SELECT * FROM type::table($table) WHERE email = $email LIMIT 1")
            .bind(("table", UserIdType::PREFIX))
            .bind(("email", normalize_email(email)))
            .await
            .map_err(DatabaseError::QueryFailed)?
            .take(0)
            .map_err(DatabaseError::QueryFailed)?;

        db_user.map(User::try_from).transpose()
    }

    /// Store the onboarding profile and mark the user as onboarded
    pub async fn complete_onboarding(
        &self,
        id: UserId,
        profile: OnboardingProfile,
    ) -> Result<Option<User>> {
        let db_user: Option<DbUser> = self
            .db
            .query(
                "UPDATE $user SET
                    full_name = $full_name,
                    bio = $bio,
                    native_language = $native_language,
                    learning_language = $learning_language,
                    location = $location,
                    profile_pic = $profile_pic ?? profile_pic,
                    is_onboarded = true,
                    updated_at = time::now()
                WHERE id = $user
                RETURN AFTER",
            )
            .bind(("user", id.to_record_id()))
            .bind(("full_name", profile.full_name))
            .bind(("bio", profile.bio))
            .bind(("native_language", profile.native_language))
            .bind(("learning_language", profile.learning_language))
            .bind(("location", profile.location))
            .bind(("profile_pic", profile.profile_pic))
            .await
            .map_err(DatabaseError::QueryFailed)?
            .take(0)
            .map_err(DatabaseError::QueryFailed)?;

        db_user.map(User::try_from).transpose()
    }

    /// Onboarded users that are neither `user` nor already their friends,
    /// plus the total count of such users
    pub async fn recommended_users(
        &self,
        user: &User,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64)> {
        let friends: Vec<RecordId> = user.friends.iter().map(RecordId::from).collect();
        let sql = format!(
            "SELECT count() AS total FROM {table} WHERE {RECOMMENDED_FILTER} GROUP ALL;
             SELECT * FROM {table} WHERE {RECOMMENDED_FILTER}
                ORDER BY created_at ASC LIMIT {limit} START {skip};",
            table = UserIdType::PREFIX,
            limit = page.limit(),
            skip = page.skip(),
        );

        let mut response = self
            .db
            .query(sql)
            .bind(("me", user.id.to_record_id()))
            .bind(("friends", friends))
            .await
            .map_err(DatabaseError::QueryFailed)?;

        let count: Option<CountRow> = response.take(0).map_err(DatabaseError::QueryFailed)?;
        let rows: Vec<DbUser> = response.take(1).map_err(DatabaseError::QueryFailed)?;

        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((users, count.map_or(0, |c| c.total)))
    }

    /// One page of `user`'s friends in friend-list order, plus the friend
    /// count
    pub async fn friends_page(&self, user: &User, page: PageRequest) -> Result<(Vec<User>, u64)> {
        let total = user.friends.len() as u64;
        let ids: Vec<RecordId> = user
            .friends
            .iter()
            .skip(page.skip() as usize)
            .take(page.limit() as usize)
            .map(RecordId::from)
            .collect();

        if ids.is_empty() {
            return Ok((vec![], total));
        }

        let rows: Vec<DbUser> = self
            .db
            .query("SELECT * FROM $ids")
            .bind(("ids", ids))
            .await
            .map_err(DatabaseError::QueryFailed)?
            .take(0)
            .map_err(DatabaseError::QueryFailed)?;

        let friends = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((friends, total))
    }

    // ===== Friend Request Operations =====

    /// Get a friend request by ID
    pub async fn get_friend_request(&self, id: FriendRequestId) -> Result<Option<FriendRequest>> {
        let db_request: Option<DbFriendRequest> = self
            .db
            .select((FriendRequestIdType::PREFIX, id.uuid().to_string()))
            .await
            .map_err(DatabaseError::QueryFailed)?;

        db_request.map(FriendRequest::try_from).transpose()
    }

    /// Any request between `a` and `b`, whichever direction and status
    pub async fn find_request_between(&self, a: UserId, b: UserId) -> Result<Option<FriendRequest>> {
        let db_request: Option<DbFriendRequest> = self
            .db
            .query(
                "SELECT * FROM type::table($table)
                WHERE (sender = $a AND recipient = $b) OR (sender = $b AND recipient = $a)
                LIMIT 1",
            )
            .bind(("table", FriendRequestIdType::PREFIX))
            .bind(("a", a.to_record_id()))
            .bind(("b", b.to_record_id()))
            .await
            .map_err(DatabaseError::QueryFailed)?
            .take(0)
            .map_err(DatabaseError::QueryFailed)?;

        db_request.map(FriendRequest::try_from).transpose()
    }

    /// Create a pending request from `sender` to `recipient`
    pub async fn create_friend_request(
        &self,
        sender: UserId,
        recipient: UserId,
    ) -> Result<FriendRequest> {
        let now = chrono::Utc::now();
        let request = FriendRequest {
            id: FriendRequestId::generate(),
            sender,
            recipient,
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let created: Option<DbFriendRequest> = self
            .db
            .create(FriendRequestIdType::PREFIX)
            .content(DbFriendRequest::from(&request))
            .await
            .map_err(DatabaseError::QueryFailed)?;

        created
            .ok_or_else(|| DatabaseError::Other("Failed to create friend request".into()))?
            .try_into()
    }

    /// Mark the request accepted and make both users friends of each other.
    ///
    /// Runs as one transaction. Friend lists are merged as sets, so
    /// accepting twice leaves a single entry on each side.
    pub async fn accept_friend_request(&self, request: &FriendRequest) -> Result<FriendRequest> {
        self.db
            .query(
                "BEGIN TRANSACTION;
                UPDATE $request SET status = $accepted, updated_at = time::now();
                UPDATE $sender SET friends = array::union(friends, [$recipient]), updated_at = time::now();
                UPDATE $recipient SET friends = array::union(friends, [$sender]), updated_at = time::now();
                COMMIT TRANSACTION;",
            )
            .bind(("request", request.id.to_record_id()))
            .bind(("accepted", FriendRequestStatus::Accepted.as_str()))
            .bind(("sender", request.sender.to_record_id()))
            .bind(("recipient", request.recipient.to_record_id()))
            .await
            .and_then(|response| response.check())
            .map_err(DatabaseError::TransactionFailed)?;

        tracing::debug!(
            "Friend request {} accepted: {} <-> {}",
            request.id,
            request.sender,
            request.recipient
        );

        self.get_friend_request(request.id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: request.id.to_string(),
            })
    }

    /// Pending requests addressed to `user`, sender populated
    pub async fn incoming_requests(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<(Vec<(FriendRequest, UserProfile)>, u64)> {
        self.requests_page(RequestListing::Incoming, user, page)
            .await
    }

    /// Accepted requests `user` sent, recipient populated
    pub async fn accepted_requests(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<(Vec<(FriendRequest, UserProfile)>, u64)> {
        self.requests_page(RequestListing::Accepted, user, page)
            .await
    }

    /// Pending requests `user` sent, recipient populated
    pub async fn outgoing_requests(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<(Vec<(FriendRequest, UserProfile)>, u64)> {
        self.requests_page(RequestListing::Outgoing, user, page)
            .await
    }

    async fn requests_page(
        &self,
        listing: RequestListing,
        user: UserId,
        page: PageRequest,
    ) -> Result<(Vec<(FriendRequest, UserProfile)>, u64)> {
        let (own, peer, status, sort) = listing.parts();
        let sql = format!(
            "SELECT count() AS total FROM {table} WHERE {own} = $me AND status = $status GROUP ALL;
             SELECT *, {peer}.* AS peer FROM {table} WHERE {own} = $me AND status = $status
                ORDER BY {sort} DESC LIMIT {limit} START {skip};",
            table = FriendRequestIdType::PREFIX,
            limit = page.limit(),
            skip = page.skip(),
        );

        let mut response = self
            .db
            .query(sql)
            .bind(("me", user.to_record_id()))
            .bind(("status", status.as_str()))
            .await
            .map_err(DatabaseError::QueryFailed)?;

        let count: Option<CountRow> = response.take(0).map_err(DatabaseError::QueryFailed)?;
        let rows: Vec<DbFriendRequestWithPeer> =
            response.take(1).map_err(DatabaseError::QueryFailed)?;

        let mut requests = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_parts()? {
                Some(pair) => requests.push(pair),
                None => tracing::warn!("Skipping {:?} friend request with a missing peer", listing),
            }
        }

        Ok((requests, count.map_or(0, |c| c.total)))
    }
}

/// Emails are matched case-insensitively and without surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn seed_user(store: &Store, name: &str, onboarded: bool) -> User {
        let user = store
            .create_user(NewUser {
                full_name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "not-a-real-hash".to_string(),
                profile_pic: format!("https://example.com/{name}.png"),
            })
            .await
            .unwrap();

        if !onboarded {
            return user;
        }

        store
            .complete_onboarding(
                user.id,
                OnboardingProfile {
                    full_name: name.to_string(),
                    bio: format!("I am {name}"),
                    native_language: "english".to_string(),
                    learning_language: "japanese".to_string(),
                    location: "Lisbon".to_string(),
                    profile_pic: Some(user.profile_pic.clone()),
                },
            )
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let store = Store::in_memory().await.unwrap();

        let user = store
            .create_user(NewUser {
                full_name: "Kim".to_string(),
                email: "  Kim@Example.com ".to_string(),
                password_hash: "hash".to_string(),
                profile_pic: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(user.email, "kim@example.com");
        assert!(!user.is_onboarded);
        assert!(user.friends.is_empty());

        let fetched = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(fetched.full_name, "Kim");

        let by_email = store
            .find_user_by_email("KIM@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(store.get_user(UserId::generate()).await.unwrap().is_none());
        assert!(
            store
                .find_user_by_email("nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_complete_onboarding() {
        let store = Store::in_memory().await.unwrap();
        let user = seed_user(&store, "Lea", true).await;

        assert!(user.is_onboarded);
        assert_eq!(user.native_language, "english");
        assert_eq!(user.learning_language, "japanese");
        assert_eq!(user.bio, "I am Lea");

        let missing = store
            .complete_onboarding(UserId::generate(), OnboardingProfile::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_recommended_users_excludes_self_friends_and_pending_onboarding() {
        let store = Store::in_memory().await.unwrap();
        let me = seed_user(&store, "Me", true).await;
        let friend = seed_user(&store, "Friend", true).await;
        let stranger = seed_user(&store, "Stranger", true).await;
        let _newbie = seed_user(&store, "Newbie", false).await;

        let request = store.create_friend_request(me.id, friend.id).await.unwrap();
        store.accept_friend_request(&request).await.unwrap();
        let me = store.get_user(me.id).await.unwrap().unwrap();

        let (users, total) = store
            .recommended_users(&me, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, stranger.id);
    }

    #[tokio::test]
    async fn test_recommended_users_paging() {
        let store = Store::in_memory().await.unwrap();
        let me = seed_user(&store, "Me", true).await;
        for i in 0..5 {
            seed_user(&store, &format!("Peer{i}"), true).await;
        }

        let (first, total) = store
            .recommended_users(&me, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(first.len(), 2);

        let (last, _) = store
            .recommended_users(&me, PageRequest::new(3, 2))
            .await
            .unwrap();
        assert_eq!(last.len(), 1);

        let (past_end, total) = store
            .recommended_users(&me, PageRequest::new(9, 2))
            .await
            .unwrap();
        assert!(past_end.is_empty());
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_accept_makes_mutual_friends_once() {
        let store = Store::in_memory().await.unwrap();
        let a = seed_user(&store, "Alice", true).await;
        let b = seed_user(&store, "Bob", true).await;

        let request = store.create_friend_request(a.id, b.id).await.unwrap();
        assert_eq!(request.status, FriendRequestStatus::Pending);

        let accepted = store.accept_friend_request(&request).await.unwrap();
        assert_eq!(accepted.status, FriendRequestStatus::Accepted);

        // accepting again must not duplicate entries
        store.accept_friend_request(&request).await.unwrap();

        let a = store.get_user(a.id).await.unwrap().unwrap();
        let b = store.get_user(b.id).await.unwrap().unwrap();
        assert_eq!(a.friends, vec![b.id]);
        assert_eq!(b.friends, vec![a.id]);
    }

    #[tokio::test]
    async fn test_find_request_between_either_direction() {
        let store = Store::in_memory().await.unwrap();
        let a = seed_user(&store, "Alice", true).await;
        let b = seed_user(&store, "Bob", true).await;
        let c = seed_user(&store, "Carol", true).await;

        let request = store.create_friend_request(a.id, b.id).await.unwrap();

        let found = store.find_request_between(b.id, a.id).await.unwrap().unwrap();
        assert_eq!(found.id, request.id);
        assert!(store.find_request_between(a.id, c.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_request_listings() {
        let store = Store::in_memory().await.unwrap();
        let me = seed_user(&store, "Me", true).await;
        let a = seed_user(&store, "Alice", true).await;
        let b = seed_user(&store, "Bob", true).await;
        let c = seed_user(&store, "Carol", true).await;

        // a -> me pending, me -> b pending, me -> c accepted
        store.create_friend_request(a.id, me.id).await.unwrap();
        store.create_friend_request(me.id, b.id).await.unwrap();
        let to_c = store.create_friend_request(me.id, c.id).await.unwrap();
        store.accept_friend_request(&to_c).await.unwrap();

        let (incoming, total) = store
            .incoming_requests(me.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(incoming[0].1.id, a.id);
        assert_eq!(incoming[0].1.full_name, "Alice");

        let (outgoing, total) = store
            .outgoing_requests(me.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(outgoing[0].1.id, b.id);

        let (accepted, total) = store
            .accepted_requests(me.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(accepted[0].0.status, FriendRequestStatus::Accepted);
        assert_eq!(accepted[0].1.id, c.id);
    }

    #[tokio::test]
    async fn test_request_listing_order() {
        let store = Store::in_memory().await.unwrap();
        let me = seed_user(&store, "Me", true).await;
        let a = seed_user(&store, "Alice", true).await;
        let b = seed_user(&store, "Bob", true).await;
        let c = seed_user(&store, "Carol", true).await;
        let d = seed_user(&store, "Dan", true).await;
        let e = seed_user(&store, "Eve", true).await;
        let f = seed_user(&store, "Finn", true).await;
        let tick = || tokio::time::sleep(std::time::Duration::from_millis(5));

        // Incoming: a then b
        store.create_friend_request(a.id, me.id).await.unwrap();
        tick().await;
        store.create_friend_request(b.id, me.id).await.unwrap();
        tick().await;

        // Outgoing and still pending: e then f
        store.create_friend_request(me.id, e.id).await.unwrap();
        tick().await;
        store.create_friend_request(me.id, f.id).await.unwrap();
        tick().await;

        // Sent to c then d, accepted in the opposite order
        let to_c = store.create_friend_request(me.id, c.id).await.unwrap();
        tick().await;
        let to_d = store.create_friend_request(me.id, d.id).await.unwrap();
        tick().await;
        store.accept_friend_request(&to_d).await.unwrap();
        tick().await;
        store.accept_friend_request(&to_c).await.unwrap();

        let peers = |rows: Vec<(FriendRequest, UserProfile)>| {
            rows.into_iter().map(|(_, peer)| peer.id).collect::<Vec<_>>()
        };

        let (incoming, _) = store
            .incoming_requests(me.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(peers(incoming), vec![b.id, a.id]);

        let (outgoing, _) = store
            .outgoing_requests(me.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(peers(outgoing), vec![f.id, e.id]);

        // Most recently accepted first, regardless of when it was sent
        let (accepted, _) = store
            .accepted_requests(me.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(peers(accepted), vec![c.id, d.id]);

        let (second, total) = store
            .accepted_requests(me.id, PageRequest::new(2, 1))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(peers(second), vec![d.id]);
    }

    #[tokio::test]
    async fn test_friends_page() {
        let store = Store::in_memory().await.unwrap();
        let me = seed_user(&store, "Me", true).await;
        for i in 0..3 {
            let peer = seed_user(&store, &format!("Peer{i}"), true).await;
            let request = store.create_friend_request(peer.id, me.id).await.unwrap();
            store.accept_friend_request(&request).await.unwrap();
        }
        let me = store.get_user(me.id).await.unwrap().unwrap();

        let (page, total) = store.friends_page(&me, PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, me.friends[0]);

        let (page, _) = store.friends_page(&me, PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, me.friends[2]);

        let (page, _) = store.friends_page(&me, PageRequest::new(5, 2)).await.unwrap();
        assert!(page.is_empty());
    }
}
