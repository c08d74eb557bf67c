pub mod listings;
pub mod media;
pub mod profile;
