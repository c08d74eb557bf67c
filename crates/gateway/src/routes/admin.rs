use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use realty_catalog::{
    browse, featured::featured_count, validation::INVALID_OPTION, FieldError, ValidationErrors,
};
use realty_database::ListingStatus;

use crate::routes::models::{
    AdminListingPageResponse, DashboardResponse, ListingQueryParams, ListingRequest,
    ListingResponse, StatusRequest,
};
use crate::services::listings as listing_service;
use crate::{ApiError, ApiJson, ApiQuery, AppState};

const RECENT_LISTINGS: usize = 3;

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Counts by status and the newest listings", body = DashboardResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardResponse>, ApiError> {
    state.require_admin(&headers).await?;

    let stats = state.listings().stats().await?;
    let recent = state.listings().list_recent(RECENT_LISTINGS).await?;

    Ok(Json(DashboardResponse {
        stats: stats.into(),
        featured_limit: state.featured_limit(),
        recent: recent.into_iter().map(ListingResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/listings",
    tag = "Admin",
    params(ListingQueryParams),
    responses(
        (status = 200, description = "Admin table with the featured counter", body = AdminListingPageResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_listings(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(params): ApiQuery<ListingQueryParams>,
) -> Result<Json<AdminListingPageResponse>, ApiError> {
    state.require_admin(&headers).await?;

    let all = state.listings().list_all().await?;
    let view = browse(&all, &params.into(), state.catalog().page_size)?;

    Ok(Json(AdminListingPageResponse {
        page: view.into(),
        featured_count: featured_count(&all),
        featured_limit: state.featured_limit(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/listings",
    tag = "Admin",
    request_body = ListingRequest,
    responses(
        (status = 201, description = "Listing created", body = ListingResponse),
        (status = 409, description = "Featured limit reached", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 502, description = "Image upload failed", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<ListingRequest>,
) -> Result<(StatusCode, Json<ListingResponse>), ApiError> {
    state.require_admin(&headers).await?;
    let listing = listing_service::create_listing(&state, &payload.into()).await?;
    Ok((StatusCode::CREATED, Json(listing.into())))
}

#[utoipa::path(
    put,
    path = "/api/admin/listings/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Listing id")),
    request_body = ListingRequest,
    responses(
        (status = 200, description = "Listing replaced", body = ListingResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Featured limit reached", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ListingRequest>,
) -> Result<Json<ListingResponse>, ApiError> {
    state.require_admin(&headers).await?;
    let listing = listing_service::update_listing(&state, &id, &payload.into()).await?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/listings/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.require_admin(&headers).await?;
    state.listings().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/admin/listings/{id}/status",
    tag = "Admin",
    params(("id" = String, Path, description = "Listing id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ListingResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Unknown status", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<StatusRequest>,
) -> Result<Json<ListingResponse>, ApiError> {
    state.require_admin(&headers).await?;

    let status = ListingStatus::parse(&payload.status).ok_or_else(|| ValidationErrors {
        errors: vec![FieldError {
            field: "status".to_string(),
            message: INVALID_OPTION.to_string(),
        }],
    })?;

    let listing = state.listings().set_status(&id, status).await?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/listings/{id}/featured",
    tag = "Admin",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Featured flag toggled", body = ListingResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Featured limit reached", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn toggle_featured(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>, ApiError> {
    state.require_admin(&headers).await?;
    let listing = listing_service::toggle_featured(&state, &id).await?;
    Ok(Json(listing.into()))
}
