//! Error types for Amity Core

use thiserror::Error;

use crate::limits::ValidationError;

/// Result type alias using Amity's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Amity error types
///
/// Disallowed friendship transitions are not errors; the engine reports
/// them as `false` / `None`. These variants cover misuse and infrastructure
/// failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid entity reference: {0}")]
    InvalidReference(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}
