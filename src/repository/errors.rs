use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// SQLSTATE reported for values that exceed a column's size limit.
pub const VALUE_TOO_LONG_CODE: &str = "22001";

/// Names of the CHECK constraints guarding the 255-byte text columns.
const LENGTH_CONSTRAINTS: [&str; 2] = ["restaurant_length", "menu_length"];

/// Failures reported by the record store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A text value exceeded its column's byte limit. Callers may shorten the
    /// value and retry.
    #[error("value too long for column (code {code})")]
    FieldTooLong {
        code: &'static str,
        #[source]
        source: DieselError,
    },
    /// Any other database failure.
    #[error("data access error: {0}")]
    DataAccess(#[source] DieselError),
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    /// The requested record, or any record at all, does not exist.
    #[error("not found")]
    NotFound,
    /// A stored row could not be converted into a domain value.
    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(e: DieselError) -> Self {
        let too_long = matches!(
            &e,
            DieselError::DatabaseError(kind, info) if is_length_violation(kind, &**info)
        );

        if too_long {
            RepositoryError::FieldTooLong {
                code: VALUE_TOO_LONG_CODE,
                source: e,
            }
        } else if matches!(e, DieselError::NotFound) {
            RepositoryError::NotFound
        } else {
            RepositoryError::DataAccess(e)
        }
    }
}

fn is_length_violation(
    kind: &DatabaseErrorKind,
    info: &(dyn DatabaseErrorInformation + Send + Sync),
) -> bool {
    let message = info.message();
    let names_constraint = LENGTH_CONSTRAINTS
        .iter()
        .any(|name| info.constraint_name() == Some(*name) || message.contains(name));
    names_constraint
        && (matches!(kind, DatabaseErrorKind::CheckViolation) || message.contains("CHECK"))
}
