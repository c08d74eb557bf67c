use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};

use crate::routes::models::{MediaUploadRequest, MediaUploadResponse};
use crate::services::media::upload_data_url;
use crate::util::upload_name;
use crate::{ApiError, ApiJson, AppState};

#[utoipa::path(
    post,
    path = "/api/admin/media",
    tag = "Media",
    request_body = MediaUploadRequest,
    responses(
        (status = 201, description = "Image hosted", body = MediaUploadResponse),
        (status = 400, description = "Not a base64 image", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 502, description = "Image host failed", body = crate::error::ErrorResponse),
        (status = 503, description = "Image hosting not configured", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<MediaUploadRequest>,
) -> Result<(StatusCode, Json<MediaUploadResponse>), ApiError> {
    let (user, _) = state.require_admin(&headers).await?;

    let name = match payload.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => upload_name(name, 0),
        _ => upload_name(&user.public_id, 0),
    };
    let hosted = upload_data_url(state.image_host(), &payload.image, &name).await?;

    Ok((StatusCode::CREATED, Json(MediaUploadResponse { url: hosted.url })))
}
