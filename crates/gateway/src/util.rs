use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::ApiError;

const SESSION_REQUIRED: &str = "Sua sessão expirou. Faça login novamente.";

pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized(SESSION_REQUIRED))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized(SESSION_REQUIRED));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized(SESSION_REQUIRED));
    }

    Ok(token.to_string())
}

/// Name given to an uploaded image: the owner's id plus a position suffix.
pub fn upload_name(owner: &str, index: usize) -> String {
    let slug: String = owner
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}-{}", slug.trim_matches('-'), index + 1)
}
