//! Database migrations

use anyhow::Context;
use sqlx::SqlitePool;
use tracing::info;

/// Migrations embedded from `crates/database/migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("database migrations failed")?;
    info!("database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_pool;
    use sqlx::Row;

    #[tokio::test]
    async fn migrations_create_every_table() {
        let (pool, _dir) = test_pool().await;

        let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(&pool)
            .await
            .unwrap();
        let tables: Vec<String> = rows.iter().map(|row| row.get("name")).collect();

        for table in [
            "users",
            "user_identities",
            "sessions",
            "password_resets",
            "broker_profiles",
            "listings",
        ] {
            assert!(tables.iter().any(|name| name == table), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let (pool, _dir) = test_pool().await;
        super::run_migrations(&pool).await.unwrap();
    }
}
