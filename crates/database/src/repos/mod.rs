//! Database repository implementations

pub mod broker_repository;
pub mod listing_repository;

pub use broker_repository::BrokerRepository;
pub use listing_repository::ListingRepository;

use chrono::{SecondsFormat, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// Fixed-width UTC timestamp, so text ordering matches time ordering.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn new_public_id() -> String {
    CUID.create_id()
}
