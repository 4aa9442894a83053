use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::{CryptError, OAuthError},
    error::log_error,
    model::{DatabaseError, ResourceType},
    web::{UserRole, validation::FieldError},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationTokenInvalid. Error: {error}")]
    AuthenticationTokenInvalid { error: jsonwebtoken::errors::Error },

    #[error("AuthenticationUserInactive")]
    AuthenticationUserInactive,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,

    #[error("AuthenticationAccountDisabled")]
    AuthenticationAccountDisabled,

    #[error("AuthenticationInsufficientRole: {role}")]
    AuthenticationInsufficientRole { role: UserRole },

    #[error("AuthenticationStateMismatch")]
    AuthenticationStateMismatch,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceUnavailable: {resource_type:?}, {reason}")]
    ResourceUnavailable {
        resource_type: ResourceType,
        reason: &'static str,
    },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceConflict: {resource_type:?}, {reason}")]
    ResourceConflict {
        resource_type: ResourceType,
        reason: &'static str,
    },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}, {reason}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("ValidationFailed: {0:?}")]
    ValidationFailed(Vec<FieldError>),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] CryptError),

    #[error("ServerOAuthError: {0}")]
    ServerOAuthError(#[from] OAuthError),

    #[error("ServerOAuthUnavailable")]
    ServerOAuthUnavailable,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerCryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServerOAuthError(_) => StatusCode::BAD_GATEWAY,
            Self::ServerOAuthUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerCryptError(_) => String::from("internal server error"),
            Self::ServerOAuthError(_) => String::from("google authentication failed"),
            Self::ServerOAuthUnavailable => String::from("google authentication is not configured"),
        }
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => String::from("user with this email already exists"),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationTokenInvalid { .. } => StatusCode::FORBIDDEN,
            Self::AuthenticationUserInactive => StatusCode::UNAUTHORIZED,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationAccountDisabled => StatusCode::UNAUTHORIZED,
            Self::AuthenticationInsufficientRole { .. } => StatusCode::FORBIDDEN,
            Self::AuthenticationStateMismatch => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationRequired => String::from("access token required"),
            Self::AuthenticationTokenInvalid { .. } => String::from("invalid token"),
            Self::AuthenticationUserInactive => String::from("user not found or inactive"),
            Self::AuthenticationInvalidCredentials => String::from("invalid credentials"),
            Self::AuthenticationAccountDisabled => String::from("account is disabled"),
            Self::AuthenticationInsufficientRole { .. } => {
                String::from("access denied, insufficient permissions")
            }
            Self::AuthenticationStateMismatch => String::from("invalid oauth state"),
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceUnavailable { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { resource_type } => {
                format!("{} not found", resource_type.to_string().to_lowercase())
            }
            Self::ResourceUnavailable { reason, .. } => reason.to_string(),
            Self::ResourceForbidden { .. } => String::from("access denied"),
            Self::ResourceConflict { reason, .. } => reason.to_string(),
            Self::ResourceFetchError { .. } => String::from("internal server error"),
            Self::ResourceBadRequest { reason, .. } => reason.to_string(),
        }
    }
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn client_display(&self) -> String {
        String::from("validation failed")
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("ValidationError - {0}")]
    ValidationError(#[from] ValidationError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_unavailable(r#type: ResourceType, reason: &'static str) -> Self {
        Self::ResourceError(ResourceError::ResourceUnavailable {
            resource_type: r#type,
            reason,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_conflict(r#type: ResourceType, reason: &'static str) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
            reason,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_bad_request(r#type: ResourceType, reason: &'static str) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            reason,
        })
    }

    /// Maps a model error: `Forbidden` becomes 403, a unique violation 409, anything else 500.
    pub fn from_database(r#type: ResourceType, error: DatabaseError) -> Self {
        if let DatabaseError::Forbidden = error {
            Self::resource_forbidden(r#type)
        } else if error.is_unique_violation() {
            Self::resource_conflict(r#type, "resource already exists")
        } else {
            Self::resource_fetch_error(r#type, error)
        }
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_token_invalid(error: jsonwebtoken::errors::Error) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid { error })
    }

    pub fn auth_user_inactive() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationUserInactive)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn auth_account_disabled() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationAccountDisabled)
    }

    pub fn auth_insufficient_role(role: UserRole) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInsufficientRole { role })
    }

    pub fn auth_state_mismatch() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationStateMismatch)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::ValidationError(ValidationError::ValidationFailed(errors))
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn server_oauth_error(e: OAuthError) -> Self {
        Self::ServerError(ServerError::ServerOAuthError(e))
    }

    pub fn server_oauth_unavailable() -> Self {
        Self::ServerError(ServerError::ServerOAuthUnavailable)
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ValidationError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ValidationError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }

    fn field_errors(&self) -> Option<Vec<FieldError>> {
        match self {
            Self::ValidationError(ValidationError::ValidationFailed(errors)) => {
                Some(errors.clone())
            }
            _ => None,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub error: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
    /// Per-field problems, validation errors only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub errors: Option<Vec<FieldError>>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();

        let body = ErrorResponse {
            error: self.client_display(),
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
            errors: self.field_errors(),
        };

        (status_code, Json(body)).into_response()
    }
}
