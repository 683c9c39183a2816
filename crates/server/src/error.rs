//! HTTP error mapping
//!
//! Every handler failure funnels through [`ServerError`], which decides
//! the status code and what the client gets to see. Internal causes are
//! logged, never leaked.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use libris_catalog::CatalogError;
use libris_core::{AppError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Missing or malformed request input
    #[error("{0}")]
    BadRequest(String),

    /// A write was rejected; carries per-field messages
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CatalogError> for ServerError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Database(AppError::Validation(validation)) => {
                Self::Validation(validation)
            }
            CatalogError::Database(AppError::RecordNotFound { entity, identifier }) => {
                Self::NotFound(format!("{} {}", entity, identifier))
            }
            CatalogError::CopyNotFound(id) => Self::NotFound(format!("Copy {}", id)),
            CatalogError::BorrowNotFound(id) => Self::NotFound(format!("Borrow {}", id)),
            other => Self::Internal(Box::new(other)),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Validation(validation) => {
                (StatusCode::BAD_REQUEST, Json(validation)).into_response()
            }
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            Self::Internal(cause) => {
                log::error!("Request failed: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ServerError =
            CatalogError::Database(ValidationError::single("book", "already borrowed").into())
                .into();
        assert!(matches!(err, ServerError::Validation(_)));
    }

    #[test]
    fn test_not_found_maps_through() {
        let err: ServerError = CatalogError::CopyNotFound("7".to_string()).into();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[test]
    fn test_other_errors_are_opaque() {
        let err: ServerError = CatalogError::Other("pool exhausted".to_string()).into();
        assert!(matches!(err, ServerError::Internal(_)));
        // the display form a client would see carries no cause
        assert_eq!(err.to_string(), "Internal error");
    }
}
