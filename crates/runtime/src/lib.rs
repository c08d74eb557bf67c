use std::sync::Arc;

use anyhow::{Context, Result};
use realty_auth::Authenticator;
use realty_config::AppConfig;
use realty_database::initialize_database;
use realty_media::{image_host, ImageHost};
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Install the global fmt subscriber, filtered by `RUST_LOG` (default `info`).
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything a request handler or CLI command needs, built once at startup.
#[derive(Clone)]
pub struct BackendServices {
    pub config: AppConfig,
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub image_host: Arc<dyn ImageHost>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());
        let image_host =
            image_host(&config.media).context("failed to build image host client")?;

        info!(
            featured_limit = config.catalog.featured_limit,
            page_size = config.catalog.page_size,
            "backend services ready"
        );

        Ok(Self {
            config: config.clone(),
            db_pool,
            authenticator,
            image_host,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
