use axum::{extract::State, http::HeaderMap, Json};
use realty_database::BrokerError;

use crate::routes::models::{BrokerResponse, ProfileRequest, ScheduleBody, VisibilityRequest};
use crate::services::profile as profile_service;
use crate::{ApiError, ApiJson, AppState};

#[utoipa::path(
    get,
    path = "/api/admin/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Profile of the signed-in broker", body = BrokerResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BrokerResponse>, ApiError> {
    let (user, _) = state.require_admin(&headers).await?;
    let profile = state
        .brokers()
        .find_by_user_id(user.id)
        .await?
        .ok_or(BrokerError::ProfileNotFound)?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    put,
    path = "/api/admin/profile",
    tag = "Profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = BrokerResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 502, description = "Photo upload failed", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<ProfileRequest>,
) -> Result<Json<BrokerResponse>, ApiError> {
    let (user, _) = state.require_admin(&headers).await?;
    let profile = profile_service::update_profile(&state, &user, &payload.into()).await?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    put,
    path = "/api/admin/profile/visibility",
    tag = "Profile",
    request_body = VisibilityRequest,
    responses(
        (status = 200, description = "Visibility changed", body = BrokerResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn set_visibility(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<VisibilityRequest>,
) -> Result<Json<BrokerResponse>, ApiError> {
    let (user, _) = state.require_admin(&headers).await?;
    let profile = state
        .brokers()
        .set_visibility(user.id, payload.is_public)
        .await?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    put,
    path = "/api/admin/profile/schedule",
    tag = "Profile",
    request_body = ScheduleBody,
    responses(
        (status = 200, description = "Schedule saved", body = BrokerResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid times", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<ScheduleBody>,
) -> Result<Json<BrokerResponse>, ApiError> {
    let (user, _) = state.require_admin(&headers).await?;
    let profile = profile_service::update_schedule(&state, &user, &payload.into()).await?;
    Ok(Json(profile.into()))
}
