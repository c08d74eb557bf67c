//! Shared types and result types for the database layer

pub mod errors;

pub use errors::{BrokerError, DatabaseError, ListingError};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type ListingResult<T> = Result<T, ListingError>;
pub type BrokerResult<T> = Result<T, BrokerError>;
