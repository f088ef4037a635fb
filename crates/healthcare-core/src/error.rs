//! Error kinds surfaced by record operations.

use thiserror::Error;

use crate::db::DbError;
use crate::models::EntityKind;
use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum Error {
    /// No actor was resolved for the request.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The record is absent, or exists but belongs to another actor.
    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure; the detail is logged, never returned.
    #[error("Internal error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<DbError> for Error {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Validation(errors) => Error::Validation(errors),
            // Assignment pairs are turned into `Conflict` by the relationship
            // manager; any other uniqueness failure is a storage fault.
            other => {
                tracing::error!(error = %other, "storage operation failed");
                Error::Internal
            }
        }
    }
}
