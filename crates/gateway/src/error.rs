use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use realty_auth::AuthError;
use realty_catalog::{CatalogError, ValidationErrors};
use realty_database::{BrokerError, ListingError};
use realty_media::MediaError;
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldErrorResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Vec<FieldErrorResponse>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn logged(self, source: &dyn std::fmt::Debug) -> Self {
        if self.status.is_server_error() {
            error!(status = %self.status, error = ?source, "request failed");
        } else {
            warn!(status = %self.status, error = ?source, "request rejected");
        }
        self
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let message = match status {
            StatusCode::PAYLOAD_TOO_LARGE => "Requisição muito grande.",
            StatusCode::UNSUPPORTED_MEDIA_TYPE => "O corpo da requisição deve ser JSON.",
            _ => "Corpo da requisição inválido.",
        };
        ApiError::new(status, message).logged(&rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request("Parâmetros de consulta inválidos.").logged(&rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal_server_error("Ocorreu um erro inesperado. Tente novamente.").logged(&error)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let status = match error {
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
            AuthError::MissingFields
            | AuthError::InvalidEmail
            | AuthError::WeakPassword { .. }
            | AuthError::WrongCurrentPassword
            | AuthError::InvalidResetToken
            | AuthError::ResetTokenExpired => StatusCode::BAD_REQUEST,
            AuthError::UserExists => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Notification(_) => StatusCode::BAD_GATEWAY,
            AuthError::Database(_) | AuthError::PasswordHash(_) | AuthError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, error.user_message()).logged(&error)
    }
}

impl From<ListingError> for ApiError {
    fn from(error: ListingError) -> Self {
        let api = match &error {
            ListingError::ListingNotFound => Self::not_found("Imóvel não encontrado"),
            ListingError::FeaturedLimitReached { limit } => Self::conflict(format!(
                "Você pode marcar no máximo {limit} imóveis como destaque!"
            )),
            ListingError::CorruptRow(_) | ListingError::DatabaseError(_) => {
                Self::internal_server_error("Erro ao acessar os imóveis.")
            }
        };
        api.logged(&error)
    }
}

impl From<BrokerError> for ApiError {
    fn from(error: BrokerError) -> Self {
        let api = match &error {
            BrokerError::ProfileNotFound => Self::not_found("Corretor não encontrado"),
            BrokerError::CorruptRow(_) | BrokerError::DatabaseError(_) => {
                Self::internal_server_error("Erro ao acessar os dados do corretor.")
            }
        };
        api.logged(&error)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut api = Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Verifique os campos destacados.",
        );
        api.fields = errors
            .errors
            .iter()
            .map(|e| FieldErrorResponse {
                field: e.field.clone(),
                message: e.message.clone(),
            })
            .collect();
        api.logged(&errors)
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::Validation(errors) => errors.into(),
            CatalogError::InvalidFilter { field, ref value } => {
                Self::bad_request(format!("Filtro inválido para {field}: {value}")).logged(&error)
            }
            CatalogError::NotFound(_) => Self::not_found("Imóvel não encontrado").logged(&error),
            CatalogError::FeaturedLimitReached { limit } => Self::conflict(format!(
                "Você pode marcar no máximo {limit} imóveis como destaque!"
            ))
            .logged(&error),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(error: MediaError) -> Self {
        let api = match &error {
            MediaError::NotConfigured => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Upload de imagens não configurado.",
            ),
            MediaError::InvalidDataUrl
            | MediaError::UnsupportedMime(_)
            | MediaError::InvalidPayload(_) => Self::bad_request("Imagem inválida."),
            MediaError::TooLarge { .. } => Self::bad_request("Imagem muito grande."),
            MediaError::Http(_) | MediaError::Rejected { .. } | MediaError::Response(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "Falha no upload da imagem.")
            }
        };
        api.logged(&error)
    }
}
