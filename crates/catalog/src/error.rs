use libris_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] AppError),

    #[error("Copy not found: {0}")]
    CopyNotFound(String),

    #[error("Borrow not found: {0}")]
    BorrowNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl CatalogError {
    /// The per-field messages when the underlying failure was a
    /// rejected validation
    pub fn as_validation(&self) -> Option<&libris_core::ValidationError> {
        match self {
            Self::Database(err) => err.as_validation(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
