//! Database layer over SurrealDB
//!
//! - connection setup for embedded (`mem://`, `surrealkv://`) and remote
//!   (`ws://`) endpoints through the `any` engine
//! - versioned schema migrations
//! - the [`Store`] with every query the API needs

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use surrealdb::{Surreal, engine::any};
use thiserror::Error;

pub mod migration;
pub mod models;
pub mod schema;
pub mod store;

pub use store::Store;

/// Core database error type
#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("Connection failed")]
    #[diagnostic(help("Check your database configuration and ensure the database is running"))]
    ConnectionFailed(#[source] surrealdb::Error),

    #[error("Query failed")]
    #[diagnostic(help("Check the query syntax and table schema"))]
    QueryFailed(#[source] surrealdb::Error),

    #[error("Transaction failed")]
    TransactionFailed(#[source] surrealdb::Error),

    #[error("Stored record has an invalid id")]
    InvalidRecordId(#[from] crate::id::IdError),

    #[error("Stored datetime could not be parsed: {0}")]
    InvalidDatetime(String),

    #[error("Record not found: {entity}")]
    NotFound { entity: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Open a database, select the namespace/database and run migrations
pub async fn connect(url: &str, namespace: &str, database: &str) -> Result<Surreal<any::Any>> {
    tracing::info!("Connecting to database at: {}", url);
    let connect_start = std::time::Instant::now();
    let db = any::connect(url)
        .await
        .map_err(DatabaseError::ConnectionFailed)?;
    tracing::debug!(
        "Database connection established in {:?}",
        connect_start.elapsed()
    );

    db.use_ns(namespace)
        .use_db(database)
        .await
        .map_err(DatabaseError::ConnectionFailed)?;

    migration::MigrationRunner::run(&db).await?;

    Ok(db)
}

/// Strip the `⟨ ⟩` escaping SurrealDB puts around complex record keys
pub fn strip_brackets(s: &str) -> &str {
    s.strip_prefix('⟨')
        .and_then(|s| s.strip_suffix('⟩'))
        .unwrap_or(s)
}

/// Strip the `d'...'` literal wrapper from a rendered datetime
pub fn strip_dt(s: &str) -> &str {
    s.strip_prefix("d'")
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(s)
}

pub fn from_surreal_datetime(dt: &surrealdb::Datetime) -> Result<DateTime<Utc>> {
    let rendered = dt.to_string();
    DateTime::parse_from_rfc3339(strip_dt(&rendered))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| DatabaseError::InvalidDatetime(format!("{rendered}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_helpers() {
        assert_eq!(strip_brackets("⟨abc-def⟩"), "abc-def");
        assert_eq!(strip_brackets("plain"), "plain");
        assert_eq!(
            strip_dt("d'2024-01-01T00:00:00Z'"),
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_datetime_round_trip() {
        let now = Utc::now();
        let surreal: surrealdb::Datetime = now.into();
        let back = from_surreal_datetime(&surreal).unwrap();
        assert_eq!(back.timestamp_micros(), now.timestamp_micros());
    }
}
