//! Domain entities for the database layer

pub mod broker;
pub mod listing;

pub use broker::{BrokerProfile, BrokerProfileUpdate, DaySchedule, WeeklySchedule};
pub use listing::{Listing, ListingStats, ListingStatus, NewListing, PropertyType};
