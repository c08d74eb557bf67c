use axum::{
    extract::{Path, State},
    Json,
};
use realty_catalog::{browse, contact::listing_contact};
use realty_database::{BrokerError, ListingError};

use crate::routes::models::{
    ContactParams, ContactResponse, ListingPageResponse, ListingQueryParams, ListingResponse,
    ListingsResponse,
};
use crate::{ApiError, ApiQuery, AppState};

#[utoipa::path(
    get,
    path = "/api/listings",
    tag = "Listings",
    params(ListingQueryParams),
    responses(
        (status = 200, description = "Filtered, sorted and paginated catalog", body = ListingPageResponse),
        (status = 400, description = "Unknown filter value", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_listings(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListingQueryParams>,
) -> Result<Json<ListingPageResponse>, ApiError> {
    let all = state.listings().list_all().await?;
    let view = browse(&all, &params.into(), state.catalog().page_size)?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    get,
    path = "/api/listings/featured",
    tag = "Listings",
    responses((status = 200, description = "Featured carousel", body = ListingsResponse))
)]
pub async fn featured_listings(
    State(state): State<AppState>,
) -> Result<Json<ListingsResponse>, ApiError> {
    let featured = state
        .listings()
        .list_featured(state.catalog().featured_carousel_size)
        .await?;
    Ok(Json(featured.into()))
}

#[utoipa::path(
    get,
    path = "/api/listings/{id}",
    tag = "Listings",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing detail", body = ListingResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing = state
        .listings()
        .find_by_public_id(&id)
        .await?
        .ok_or(ListingError::ListingNotFound)?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    get,
    path = "/api/listings/{id}/contact",
    tag = "Listings",
    params(
        ("id" = String, Path, description = "Listing id"),
        ContactParams
    ),
    responses(
        (status = 200, description = "WhatsApp, e-mail and map links", body = ContactResponse),
        (status = 404, description = "Listing or public broker not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn contact_for_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<ContactParams>,
) -> Result<Json<ContactResponse>, ApiError> {
    let listing = state
        .listings()
        .find_by_public_id(&id)
        .await?
        .ok_or(ListingError::ListingNotFound)?;
    let broker = state
        .brokers()
        .find_by_public_id(&params.broker)
        .await?
        .filter(|broker| broker.is_public)
        .ok_or(BrokerError::ProfileNotFound)?;

    Ok(Json(listing_contact(&broker, &listing).into()))
}
