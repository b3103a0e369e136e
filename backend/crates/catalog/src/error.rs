//! Catalog Error Types

use std::fmt;

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions::sqlx_error_kind, kind::ErrorKind};
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// An id in the path or body that does not resolve
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("User not authorized")]
    Forbidden,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        CatalogError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::Validation(_) => ErrorKind::BadRequest,
            CatalogError::Conflict(_) => ErrorKind::Conflict,
            CatalogError::Forbidden => ErrorKind::Forbidden,
            CatalogError::Auth(e) => e.kind(),
            CatalogError::Database(e) => sqlx_error_kind(e).0,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            CatalogError::Auth(e) => e.into_app_error(),
            CatalogError::Database(e) => AppError::from(e),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    pub fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Auth(e) => e.log(),
            CatalogError::Forbidden => {
                tracing::warn!("Forbidden catalog access");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_id() {
        let err = CatalogError::not_found("Song", "42");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.into_app_error().message(), "Song 42 not found");
    }

    #[test]
    fn test_auth_errors_keep_their_status() {
        let err = CatalogError::from(AuthError::Unauthenticated);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        let err = CatalogError::from(AuthError::Forbidden);
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CatalogError::validation("Title is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CatalogError::Conflict("taken".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(CatalogError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_database_detail_is_hidden() {
        let err = CatalogError::from(sqlx::Error::Protocol("bad row".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let app = err.into_app_error();
        assert!(!app.message().contains("bad row"));
    }
}
