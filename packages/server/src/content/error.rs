use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0}")]
    NotFound(String),

    /// A referenced record exists but belongs to a different key.
    #[error("{0}")]
    IntegrityViolation(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] DbErr),
}
