use realty_catalog::{check_toggle, validate_listing, ListingInput};
use realty_database::{Listing, ListingError, NewListing};
use tracing::info;

use super::media::{resolve_images, warn_orphaned};
use crate::{ApiError, AppState};

/// Validate, upload pending images, then insert.
pub async fn create_listing(state: &AppState, input: &ListingInput) -> Result<Listing, ApiError> {
    let mut listing = validate_listing(input)?;
    ensure_featured_slot(state, &listing, false).await?;

    let images = resolve_images(state.image_host(), &listing.images, &listing.title).await?;
    listing.images = images.urls;

    state
        .listings()
        .create(&listing, state.featured_limit())
        .await
        .map_err(|error| {
            warn_orphaned(&images.uploaded, &error);
            ApiError::from(error)
        })
}

/// Replace a listing with the submitted form.
pub async fn update_listing(
    state: &AppState,
    id: &str,
    input: &ListingInput,
) -> Result<Listing, ApiError> {
    let mut listing = validate_listing(input)?;
    let current = state
        .listings()
        .find_by_public_id(id)
        .await?
        .ok_or(ListingError::ListingNotFound)?;
    ensure_featured_slot(state, &listing, current.featured).await?;

    let images = resolve_images(state.image_host(), &listing.images, &listing.title).await?;
    listing.images = images.urls;

    state
        .listings()
        .update(id, &listing, state.featured_limit())
        .await
        .map_err(|error| {
            warn_orphaned(&images.uploaded, &error);
            ApiError::from(error)
        })
}

/// Flip the featured flag of `id`, refusing to go past the cap.
pub async fn toggle_featured(state: &AppState, id: &str) -> Result<Listing, ApiError> {
    let limit = state.featured_limit();
    let all = state.listings().list_all().await?;
    let featured = check_toggle(&all, id, limit)?;

    let listing = state.listings().set_featured(id, featured, limit).await?;
    info!(listing = %id, featured, "featured flag toggled");
    Ok(listing)
}

// Fail before uploading anything when the cap already blocks the write.
async fn ensure_featured_slot(
    state: &AppState,
    listing: &NewListing,
    already_featured: bool,
) -> Result<(), ApiError> {
    if !listing.featured || already_featured {
        return Ok(());
    }

    let limit = state.featured_limit();
    let count = state.listings().count_featured().await?;
    if count >= limit as i64 {
        return Err(ListingError::FeaturedLimitReached { limit }.into());
    }
    Ok(())
}
