use thiserror::Error;

use crate::repository::errors::RepositoryError;

/// Error type used by the aggregation services.
///
/// Store failures keep their original classification inside
/// [`ServiceError::Repository`] so callers can still branch on
/// [`RepositoryError::FieldTooLong`], [`RepositoryError::NotFound`] and the rest.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The record store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// A record in the set being averaged breaks an aggregation precondition.
    #[error("inconsistent state: {0}")]
    StateInconsistency(String),
    /// The caller and the store disagree about a record.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
