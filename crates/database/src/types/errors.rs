//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Listing-specific database errors
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Listing not found")]
    ListingNotFound,

    #[error("Featured limit of {limit} listings reached")]
    FeaturedLimitReached { limit: usize },

    #[error("Corrupt listing row: {0}")]
    CorruptRow(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Broker-profile database errors
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Broker profile not found")]
    ProfileNotFound,

    #[error("Corrupt broker profile row: {0}")]
    CorruptRow(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ListingError {
    fn from(error: sqlx::Error) -> Self {
        ListingError::DatabaseError(error.to_string())
    }
}

impl From<sqlx::Error> for BrokerError {
    fn from(error: sqlx::Error) -> Self {
        BrokerError::DatabaseError(error.to_string())
    }
}

impl From<serde_json::Error> for ListingError {
    fn from(error: serde_json::Error) -> Self {
        ListingError::CorruptRow(error.to_string())
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(error: serde_json::Error) -> Self {
        BrokerError::CorruptRow(error.to_string())
    }
}
