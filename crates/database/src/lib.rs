//! Realty Database Crate
//!
//! SQLite persistence for listings and broker profiles: connection setup,
//! embedded migrations, entities and repositories.

use realty_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{BrokerRepository, ListingRepository};

pub use entities::{
    BrokerProfile, BrokerProfileUpdate, DaySchedule, Listing, ListingStats, ListingStatus,
    NewListing, PropertyType, WeeklySchedule,
};

pub use types::{
    BrokerError, BrokerResult, DatabaseError, DatabaseResult, ListingError, ListingResult,
};

/// Open the pool and apply pending migrations.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    pub async fn test_pool() -> (SqlitePool, TempDir) {
        test_pool_with_connections(2).await
    }

    pub async fn test_pool_with_connections(max_connections: u32) -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    pub async fn insert_user(pool: &SqlitePool, email: &str) -> (i64, String) {
        let public_id = repos::new_public_id();
        let now = repos::timestamp();
        let result = sqlx::query(
            "INSERT INTO users (public_id, email, display_name, created_at, updated_at) VALUES (?, ?, NULL, ?, ?)",
        )
        .bind(&public_id)
        .bind(email)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();

        (result.last_insert_rowid(), public_id)
    }
}
