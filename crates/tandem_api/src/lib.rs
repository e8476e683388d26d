//! Tandem API types and definitions
//!
//! This crate defines the request/response types for the Tandem REST API,
//! shared between server and client implementations.

pub mod error;
pub mod requests;
pub mod responses;

pub use error::ApiError;

// Re-export common types from tandem-core
pub use tandem_core::{FriendRequestId, FriendRequestStatus, UserId, UserProfile};

/// API version constant
pub const API_VERSION: &str = "v1";
