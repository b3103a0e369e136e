//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions::sqlx_error_kind, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UserNameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is suspended")]
    AccountSuspended,

    #[error("Admin role cannot be assigned to a user")]
    AdminRoleNotAllowed,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("{0}")]
    Validation(String),

    #[error("Role not found")]
    RoleNotFound,

    #[error("Role name already exists")]
    RoleNameTaken,

    /// No refresh cookie on the request
    #[error("Unauthorized cookie")]
    RefreshTokenMissing,

    /// Refresh cookie present but unowned, expired, forged, or for someone else
    #[error("Forbidden, no correlated user")]
    RefreshTokenRejected,

    #[error("Invalid or expired access token")]
    InvalidAccessToken,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("User not authorized")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound | AuthError::RoleNotFound => ErrorKind::NotFound,
            AuthError::UserNameTaken | AuthError::RoleNameTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::RefreshTokenMissing
            | AuthError::InvalidAccessToken
            | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::AccountSuspended
            | AuthError::AdminRoleNotAllowed
            | AuthError::RefreshTokenRejected
            | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UnknownRole(_) | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(e) => sqlx_error_kind(e).0,
            AuthError::App(e) => e.kind(),
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Database(e) => AppError::from(e),
            AuthError::App(e) => e,
            AuthError::Internal(_) => AppError::internal("Internal server error"),
            AuthError::UnknownRole(_) => AppError::new(self.kind(), self.to_string())
                .with_action("Use one of the roles listed at /api/roles"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::App(e) if e.is_server_error() => {
                tracing::error!(error = %e, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RefreshTokenRejected => {
                tracing::warn!("Refresh token rejected");
            }
            AuthError::AdminRoleNotAllowed | AuthError::Forbidden => {
                tracing::warn!(error = %self, "Forbidden access");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::Internal(format!("Token encoding failed: {err}"))
    }
}
