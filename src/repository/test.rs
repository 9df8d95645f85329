use std::cell::{Cell, RefCell};

use chrono::Local;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::lunch_record::{
    LunchRecord, LunchRecordChanges, LunchRecordGroup, NewLunchRecord,
};
use crate::domain::types::{AverageGrade, LunchRecordId};
use crate::repository::errors::{RepositoryError, RepositoryResult, VALUE_TOO_LONG_CODE};
use crate::repository::{LunchRecordReader, LunchRecordStore, LunchRecordWriter, UnitOfWork};

/// How [`TestRepository`] answers inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertBehavior {
    /// Reject text longer than the given number of bytes, like the SQLite
    /// CHECK constraints do.
    EnforceTextLimit(usize),
    /// Report every insert as too long.
    AlwaysTooLong,
    /// Fail every insert with a generic data-access error.
    AlwaysFail,
}

/// Simple in-memory repository used for unit tests.
///
/// `atomically` snapshots the records and restores them when the closure
/// fails, mirroring a database rollback.
pub struct TestRepository {
    records: RefCell<Vec<LunchRecord>>,
    next_id: Cell<i32>,
    insert_behavior: InsertBehavior,
    insert_attempts: Cell<usize>,
    average_writes: Cell<usize>,
    rollbacks: Cell<usize>,
}

impl TestRepository {
    pub fn new(records: Vec<LunchRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id.get()).max().unwrap_or(0) + 1;
        Self {
            records: RefCell::new(records),
            next_id: Cell::new(next_id),
            insert_behavior: InsertBehavior::EnforceTextLimit(255),
            insert_attempts: Cell::new(0),
            average_writes: Cell::new(0),
            rollbacks: Cell::new(0),
        }
    }

    pub fn with_insert_behavior(mut self, behavior: InsertBehavior) -> Self {
        self.insert_behavior = behavior;
        self
    }

    /// Current contents, in insertion order.
    pub fn records(&self) -> Vec<LunchRecord> {
        self.records.borrow().clone()
    }

    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.get()
    }

    /// Number of `update_average_grade_by_group` calls, rolled back or not.
    pub fn average_writes(&self) -> usize {
        self.average_writes.get()
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.get()
    }

    fn too_long(constraint: &str) -> RepositoryError {
        RepositoryError::FieldTooLong {
            code: VALUE_TOO_LONG_CODE,
            source: DieselError::DatabaseError(
                DatabaseErrorKind::CheckViolation,
                Box::new(format!("CHECK constraint failed: {constraint}")),
            ),
        }
    }
}

impl LunchRecordReader for TestRepository {
    fn list_lunch_records(&self) -> RepositoryResult<Vec<LunchRecord>> {
        let records = self.records();
        if records.is_empty() {
            return Err(RepositoryError::NotFound);
        }
        Ok(records)
    }

    fn list_lunch_records_by_group(
        &self,
        group: &LunchRecordGroup,
    ) -> RepositoryResult<Vec<LunchRecord>> {
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|r| &r.group() == group)
            .cloned()
            .collect())
    }

    fn get_lunch_record_by_id(&self, id: LunchRecordId) -> RepositoryResult<LunchRecord> {
        self.records
            .borrow()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

impl LunchRecordWriter for TestRepository {
    fn create_lunch_record(&self, record: &NewLunchRecord) -> RepositoryResult<LunchRecord> {
        self.insert_attempts.set(self.insert_attempts.get() + 1);

        match self.insert_behavior {
            InsertBehavior::AlwaysTooLong => return Err(Self::too_long("restaurant_length")),
            InsertBehavior::AlwaysFail => {
                return Err(RepositoryError::DataAccess(DieselError::DatabaseError(
                    DatabaseErrorKind::UniqueViolation,
                    Box::new("UNIQUE constraint failed: lunch_records.id".to_string()),
                )));
            }
            InsertBehavior::EnforceTextLimit(limit) => {
                if record.restaurant.byte_len() > limit {
                    return Err(Self::too_long("restaurant_length"));
                }
                if record.menu.byte_len() > limit {
                    return Err(Self::too_long("menu_length"));
                }
            }
        }

        let id = LunchRecordId::new(self.next_id.get()).expect("test ids are positive");
        self.next_id.set(self.next_id.get() + 1);

        let saved = LunchRecord {
            id,
            restaurant: record.restaurant.clone(),
            menu: record.menu.clone(),
            image: record.image.clone(),
            price: record.price,
            grade: record.grade,
            average_grade: record.average_grade,
            update_at: record.update_at,
            create_at: record.create_at,
        };
        self.records.borrow_mut().push(saved.clone());
        Ok(saved)
    }

    fn update_lunch_record(
        &self,
        id: LunchRecordId,
        changes: &LunchRecordChanges,
    ) -> RepositoryResult<usize> {
        let mut records = self.records.borrow_mut();
        let mut affected = 0;
        for record in records.iter_mut().filter(|r| r.id == id) {
            record.apply(changes);
            record.update_at = Local::now().time();
            affected += 1;
        }
        Ok(affected)
    }

    fn update_average_grade_by_group(
        &self,
        average: AverageGrade,
        group: &LunchRecordGroup,
    ) -> RepositoryResult<usize> {
        self.average_writes.set(self.average_writes.get() + 1);
        let mut records = self.records.borrow_mut();
        let mut affected = 0;
        for record in records.iter_mut().filter(|r| &r.group() == group) {
            record.average_grade = average;
            record.update_at = Local::now().time();
            affected += 1;
        }
        Ok(affected)
    }

    fn delete_lunch_record(&self, id: LunchRecordId) -> RepositoryResult<usize> {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(before - records.len())
    }

    fn delete_all_lunch_records(&self) -> RepositoryResult<usize> {
        Ok(self.records.borrow_mut().drain(..).count())
    }
}

impl UnitOfWork for TestRepository {
    fn atomically<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn LunchRecordStore) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let snapshot = self.records();
        let result = f(self);
        if result.is_err() {
            *self.records.borrow_mut() = snapshot;
            self.rollbacks.set(self.rollbacks.get() + 1);
        }
        result
    }
}
