//! Tandem Core - users, friend requests and their storage
//!
//! This crate holds the domain model of the language-exchange network:
//! typed ids, users and friend requests, pagination rules, and the
//! SurrealDB-backed [`db::Store`] that every API operation goes through.

pub mod db;
pub mod id;
pub mod models;
pub mod pagination;

// Macros are automatically available at crate root due to #[macro_export]

pub use db::{DatabaseError, Store};
pub use id::{FriendRequestId, Id, IdError, IdType, UserId};
pub use models::{
    FriendRequest, FriendRequestStatus, NewUser, OnboardingProfile, User, UserProfile,
};
pub use pagination::{PageInfo, PageRequest};
