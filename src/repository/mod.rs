use crate::db::{DbConnection, DbPool};
use crate::domain::lunch_record::{
    LunchRecord, LunchRecordChanges, LunchRecordGroup, NewLunchRecord,
};
use crate::domain::types::{AverageGrade, LunchRecordId};

use self::errors::{RepositoryError, RepositoryResult};

pub mod errors;
pub mod lunch_record;
#[cfg(test)]
pub mod test;

pub use self::lunch_record::DieselTransaction;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations for lunch records.
pub trait LunchRecordReader {
    /// List every record ordered by id.
    ///
    /// Fails with [`RepositoryError::NotFound`] when the table is empty rather
    /// than returning an empty list. Batch callers rely on this to stop early,
    /// so it is kept even though it makes "no data yet" look like an error.
    fn list_lunch_records(&self) -> RepositoryResult<Vec<LunchRecord>>;
    /// List the records of one group ordered by id. An unknown group yields
    /// an empty list.
    fn list_lunch_records_by_group(
        &self,
        group: &LunchRecordGroup,
    ) -> RepositoryResult<Vec<LunchRecord>>;
    /// Retrieve a record by its identifier.
    fn get_lunch_record_by_id(&self, id: LunchRecordId) -> RepositoryResult<LunchRecord>;
}

/// Write operations for lunch records.
pub trait LunchRecordWriter {
    /// Persist a new record and return it with its assigned id.
    fn create_lunch_record(&self, record: &NewLunchRecord) -> RepositoryResult<LunchRecord>;
    /// Overwrite the editable fields of a record and refresh `update_at`.
    fn update_lunch_record(
        &self,
        id: LunchRecordId,
        changes: &LunchRecordChanges,
    ) -> RepositoryResult<usize>;
    /// Store `average` on every record of `group` and refresh `update_at`.
    fn update_average_grade_by_group(
        &self,
        average: AverageGrade,
        group: &LunchRecordGroup,
    ) -> RepositoryResult<usize>;
    /// Delete a single record.
    fn delete_lunch_record(&self, id: LunchRecordId) -> RepositoryResult<usize>;
    /// Delete every record.
    fn delete_all_lunch_records(&self) -> RepositoryResult<usize>;
}

/// Full record store capability handed to units of work.
pub trait LunchRecordStore: LunchRecordReader + LunchRecordWriter {}

impl<T: LunchRecordReader + LunchRecordWriter + ?Sized> LunchRecordStore for T {}

/// Runs a group of store operations atomically.
pub trait UnitOfWork {
    /// Run `f` against a store whose writes are committed only when `f`
    /// returns `Ok`. Any error rolls back every write made inside `f`.
    fn atomically<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn LunchRecordStore) -> Result<T, E>,
        E: From<RepositoryError>;
}
