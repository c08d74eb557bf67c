use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use realty_auth::{AuthSession, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{util::require_bearer, ApiError, ApiJson, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

impl SessionResponse {
    pub fn new(session: AuthSession, user: User) -> Self {
        Self {
            token: session.token,
            user: user.into(),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.public_id,
            email: value.email,
            display_name: value.display_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Wrong email or password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Por favor, preencha todos os campos."));
    }

    let session = state
        .authenticator()
        .login_with_password(&payload.email, &payload.password)
        .await?;
    let user = state.authenticator().user_profile(session.user_id).await?;

    Ok(Json(SessionResponse::new(session, user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticator().logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Signed-in admin", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let (user, _) = state.require_admin(&headers).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    tag = "Auth",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Reset link sent when the address is registered", body = MessageResponse)
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PasswordResetRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::bad_request("Informe o e-mail cadastrado."));
    }

    state
        .authenticator()
        .request_password_reset(&payload.email)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        MessageResponse::new("Se o e-mail estiver cadastrado, você receberá um link de recuperação."),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    tag = "Auth",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Invalid, used or expired token", body = crate::error::ErrorResponse)
    )
)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PasswordResetConfirmRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .authenticator()
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(MessageResponse::new("Senha redefinida com sucesso."))
}

#[utoipa::path(
    post,
    path = "/api/auth/password",
    tag = "Auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Wrong current password or weak new password", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user, _) = state.require_admin(&headers).await?;
    state
        .authenticator()
        .change_password(&user, &payload.current_password, &payload.new_password)
        .await?;

    Ok(MessageResponse::new("Senha alterada com sucesso."))
}

#[utoipa::path(
    post,
    path = "/api/auth/deactivate",
    tag = "Auth",
    responses(
        (status = 200, description = "Profile hidden and sessions ended", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn deactivate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user, _) = state.require_admin(&headers).await?;
    state.authenticator().deactivate(&user).await?;
    Ok(MessageResponse::new("Conta desativada."))
}

#[utoipa::path(
    delete,
    path = "/api/auth/account",
    tag = "Auth",
    responses(
        (status = 204, description = "Account and profile deleted"),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let (user, _) = state.require_admin(&headers).await?;
    state.authenticator().delete_account(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Auth",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin account created", body = UserResponse),
        (status = 400, description = "Missing fields, bad email or weak password", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    state.require_admin(&headers).await?;
    let user = state
        .authenticator()
        .register_admin(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}
