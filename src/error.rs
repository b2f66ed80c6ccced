use crate::repositories::RepositoryError;
use crate::services::{
    AuthError, CompanyServiceError, GatewayError, OnboardingError, VerificationError,
};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("You are not allowed to manage this company")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("The confirmation does not match the current value")]
    ConfirmationMismatch,

    #[error("Invalid verification code")]
    InvalidCode,

    /// Detail is logged, never returned.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{phase} failed: {message}")]
    Upstream { phase: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::AlreadyExists(_)
            | AppError::ConfirmationMismatch
            | AppError::InvalidCode => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_)
            | AppError::Upstream { .. }
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `error` field of the response envelope.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::AlreadyExists(msg) => {
                msg.clone()
            }
            AppError::Configuration(_) => "Configuration error".to_string(),
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Configuration(detail) => tracing::error!(%detail, "configuration error"),
            AppError::Database(detail) => tracing::error!(%detail, "database error"),
            AppError::Internal(detail) => tracing::error!(%detail, "internal error"),
            AppError::Upstream { phase, message } => {
                tracing::warn!(%phase, %message, "upstream call failed")
            }
            _ => {}
        }

        let status = self.status();
        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound("Record not found".to_string()),
            RepositoryError::AlreadyExists => {
                AppError::AlreadyExists("Record already exists".to_string())
            }
            RepositoryError::Database(e) => AppError::Database(e.to_string()),
            RepositoryError::CorruptState(detail) => AppError::Internal(detail),
        }
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Validation(msg) => AppError::Validation(msg),
            VerificationError::AlreadyExists(msg) => AppError::AlreadyExists(msg),
            VerificationError::ConfirmationMismatch => AppError::ConfirmationMismatch,
            VerificationError::InvalidCode => AppError::InvalidCode,
            e @ (VerificationError::NoSender
            | VerificationError::NoDomain
            | VerificationError::DomainNotAuthenticated) => AppError::Validation(e.to_string()),
            VerificationError::Upstream {
                source: GatewayError::NotConfigured(service),
                phase,
            } => AppError::Configuration(format!("{} API key missing during {}", service, phase)),
            VerificationError::Upstream { phase, source } => AppError::Upstream {
                phase: phase.to_string(),
                message: source.public_message(),
            },
            VerificationError::Repository(e) => e.into(),
        }
    }
}

impl From<OnboardingError> for AppError {
    fn from(err: OnboardingError) -> Self {
        match err {
            OnboardingError::CompanyNotFound => AppError::NotFound(err.to_string()),
            OnboardingError::Repository(e) => e.into(),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<CompanyServiceError> for AppError {
    fn from(err: CompanyServiceError) -> Self {
        match err {
            CompanyServiceError::InvalidEmail
            | CompanyServiceError::InvalidName
            | CompanyServiceError::LastAdmin => AppError::Validation(err.to_string()),
            CompanyServiceError::CompanyNotFound | CompanyServiceError::ProfileNotFound => {
                AppError::NotFound(err.to_string())
            }
            CompanyServiceError::AlreadyMember => AppError::AlreadyExists(err.to_string()),
            CompanyServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::Expired | AuthError::ProfileNotFound => {
                AppError::Unauthorized
            }
            AuthError::InvalidTtl => AppError::Validation(err.to_string()),
            AuthError::Database(e) => AppError::Database(e.to_string()),
            AuthError::Repository(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::VerificationPhase;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AlreadyExists("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCode.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Configuration("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_credential_is_a_generic_configuration_error() {
        let err: AppError = VerificationError::Upstream {
            phase: VerificationPhase::CreateDomain,
            source: GatewayError::NotConfigured("Brevo"),
        }
        .into();

        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(err.public_message(), "Configuration error");
    }

    #[test]
    fn test_upstream_message_names_the_phase() {
        let err: AppError = VerificationError::Upstream {
            phase: VerificationPhase::CreateSender,
            source: GatewayError::Rejected {
                status: 400,
                message: "sender is blocked".to_string(),
            },
        }
        .into();

        assert_eq!(err.public_message(), "Sender creation failed: sender is blocked");
    }

    #[test]
    fn test_database_detail_is_hidden() {
        let err: AppError = RepositoryError::CorruptState("bad json".into()).into();
        assert_eq!(err.public_message(), "Internal server error");
    }
}
