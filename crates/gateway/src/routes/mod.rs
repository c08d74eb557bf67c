pub mod admin;
pub mod auth;
pub mod brokers;
pub mod health;
pub mod listings;
pub mod media;
pub mod models;
pub mod profile;
