//! HTTP surface of the realty backend.
//!
//! Public catalog and broker directory endpoints are open. Everything under
//! `/api/admin` plus the account endpoints in `/api/auth` need a bearer
//! session token issued by `POST /api/auth/login`.

mod error;
mod extract;
mod state;
mod util;

pub mod docs;
pub mod middleware;
pub mod routes;
pub mod services;

pub use error::{ApiError, ErrorResponse, FieldErrorResponse};
pub use extract::{ApiJson, ApiQuery};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;

/// Request body ceiling. Image uploads arrive as base64 data URLs, so the
/// body must fit the largest accepted image after encoding plus the JSON
/// envelope around it.
pub const MAX_REQUEST_BYTES: usize = realty_media::MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth routes
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/me", get(routes::auth::me))
        .route(
            "/api/auth/password-reset",
            post(routes::auth::request_password_reset),
        )
        .route(
            "/api/auth/password-reset/confirm",
            post(routes::auth::confirm_password_reset),
        )
        .route("/api/auth/password", post(routes::auth::change_password))
        .route("/api/auth/deactivate", post(routes::auth::deactivate))
        .route(
            "/api/auth/account",
            delete(routes::auth::delete_account),
        )
        // Public catalog
        .route("/api/listings", get(routes::listings::list_listings))
        .route(
            "/api/listings/featured",
            get(routes::listings::featured_listings),
        )
        .route("/api/listings/:id", get(routes::listings::get_listing))
        .route(
            "/api/listings/:id/contact",
            get(routes::listings::contact_for_listing),
        )
        .route("/api/brokers", get(routes::brokers::list_brokers))
        .route(
            "/api/brokers/:id/contact",
            get(routes::brokers::contact_broker),
        )
        // Admin routes
        .route("/api/admin/dashboard", get(routes::admin::dashboard))
        .route(
            "/api/admin/listings",
            get(routes::admin::list_listings).post(routes::admin::create_listing),
        )
        .route(
            "/api/admin/listings/:id",
            put(routes::admin::update_listing).delete(routes::admin::delete_listing),
        )
        .route(
            "/api/admin/listings/:id/status",
            patch(routes::admin::set_status),
        )
        .route(
            "/api/admin/listings/:id/featured",
            post(routes::admin::toggle_featured),
        )
        .route("/api/admin/users", post(routes::auth::create_admin))
        .route(
            "/api/admin/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route(
            "/api/admin/profile/visibility",
            put(routes::profile::set_visibility),
        )
        .route(
            "/api/admin/profile/schedule",
            put(routes::profile::update_schedule),
        )
        .route("/api/admin/media", post(routes::media::upload_image))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(middleware::trace_layer())
}
