use std::sync::Arc;

use axum::http::HeaderMap;
use realty_auth::{AuthSession, Authenticator, User};
use realty_config::CatalogConfig;
use realty_database::{BrokerRepository, ListingRepository};
use realty_media::ImageHost;

use crate::util::require_bearer;
use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    listings: ListingRepository,
    brokers: BrokerRepository,
    image_host: Arc<dyn ImageHost>,
    catalog: CatalogConfig,
}

impl AppState {
    pub fn new(
        authenticator: Authenticator,
        image_host: Arc<dyn ImageHost>,
        catalog: CatalogConfig,
    ) -> Self {
        let pool = authenticator.pool();
        Self {
            listings: ListingRepository::new(pool.clone()),
            brokers: BrokerRepository::new(pool),
            authenticator,
            image_host,
            catalog,
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn listings(&self) -> &ListingRepository {
        &self.listings
    }

    pub fn brokers(&self) -> &BrokerRepository {
        &self.brokers
    }

    pub fn image_host(&self) -> &dyn ImageHost {
        self.image_host.as_ref()
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    pub fn featured_limit(&self) -> usize {
        self.catalog.featured_limit
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }

    /// Resolve the bearer token in `headers` to its admin account.
    pub async fn require_admin(&self, headers: &HeaderMap) -> Result<(User, AuthSession), ApiError> {
        let token = require_bearer(headers)?;
        self.authenticate(&token).await
    }
}
