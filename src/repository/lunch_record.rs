use std::cell::RefCell;

use chrono::{Local, NaiveTime};
use diesel::prelude::*;
use diesel::result::Error as DieselError;

use crate::domain::lunch_record::{
    LunchRecord, LunchRecordChanges, LunchRecordGroup, NewLunchRecord,
};
use crate::domain::types::{AverageGrade, LunchRecordId};
use crate::models::lunch_record::{
    LunchRecord as DbLunchRecord, LunchRecordChanges as DbLunchRecordChanges,
    NewLunchRecord as DbNewLunchRecord,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, LunchRecordReader, LunchRecordStore, LunchRecordWriter, UnitOfWork,
};

/// Store bound to the connection of an open transaction.
///
/// Handed to the closure passed to [`UnitOfWork::atomically`]; every call goes
/// through the same connection so the writes commit or roll back together.
pub struct DieselTransaction<'c> {
    conn: RefCell<&'c mut SqliteConnection>,
}

impl<'c> DieselTransaction<'c> {
    fn new(conn: &'c mut SqliteConnection) -> Self {
        Self {
            conn: RefCell::new(conn),
        }
    }
}

/// Outcome of a transaction closure, keeping the caller's error apart from
/// failures of `BEGIN`/`COMMIT` themselves.
enum Rollback<E> {
    Aborted(E),
    Database(DieselError),
}

impl<E> From<DieselError> for Rollback<E> {
    fn from(e: DieselError) -> Self {
        Rollback::Database(e)
    }
}

fn now() -> NaiveTime {
    Local::now().time()
}

fn into_domain(rows: Vec<DbLunchRecord>) -> RepositoryResult<Vec<LunchRecord>> {
    Ok(rows
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<LunchRecord>, _>>()?)
}

fn list_all(conn: &mut SqliteConnection) -> RepositoryResult<Vec<LunchRecord>> {
    use crate::schema::lunch_records;

    let rows = lunch_records::table
        .order(lunch_records::id.asc())
        .select(DbLunchRecord::as_select())
        .load(conn)?;

    if rows.is_empty() {
        return Err(RepositoryError::NotFound);
    }

    into_domain(rows)
}

fn list_by_group(
    conn: &mut SqliteConnection,
    group: &LunchRecordGroup,
) -> RepositoryResult<Vec<LunchRecord>> {
    use crate::schema::lunch_records;

    let rows = lunch_records::table
        .filter(lunch_records::restaurant.eq(group.restaurant().as_str()))
        .filter(lunch_records::menu.eq(group.menu().as_str()))
        .order(lunch_records::id.asc())
        .select(DbLunchRecord::as_select())
        .load(conn)?;

    into_domain(rows)
}

fn get_by_id(conn: &mut SqliteConnection, id: LunchRecordId) -> RepositoryResult<LunchRecord> {
    use crate::schema::lunch_records;

    let row = lunch_records::table
        .find(id.get())
        .select(DbLunchRecord::as_select())
        .first(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    Ok(row.try_into()?)
}

fn insert(conn: &mut SqliteConnection, record: &NewLunchRecord) -> RepositoryResult<LunchRecord> {
    use crate::schema::lunch_records;

    let row: DbLunchRecord = diesel::insert_into(lunch_records::table)
        .values(DbNewLunchRecord::from(record))
        .returning(DbLunchRecord::as_returning())
        .get_result(conn)
        .inspect_err(|e| log::error!("Failed to insert lunch record: {e}"))?;

    Ok(row.try_into()?)
}

fn update_fields(
    conn: &mut SqliteConnection,
    id: LunchRecordId,
    changes: &LunchRecordChanges,
) -> RepositoryResult<usize> {
    use crate::schema::lunch_records;

    let affected = diesel::update(lunch_records::table.find(id.get()))
        .set(DbLunchRecordChanges::new(changes, now()))
        .execute(conn)?;

    log::info!("updated lunch record {id}: {affected} row(s)");
    Ok(affected)
}

fn update_average(
    conn: &mut SqliteConnection,
    average: AverageGrade,
    group: &LunchRecordGroup,
) -> RepositoryResult<usize> {
    use crate::schema::lunch_records;

    let affected = diesel::update(
        lunch_records::table
            .filter(lunch_records::restaurant.eq(group.restaurant().as_str()))
            .filter(lunch_records::menu.eq(group.menu().as_str())),
    )
    .set((
        lunch_records::average_grade.eq(average.get()),
        lunch_records::update_at.eq(now()),
    ))
    .execute(conn)?;

    log::info!("set average grade {average} on {affected} row(s) of {group}");
    Ok(affected)
}

fn delete_one(conn: &mut SqliteConnection, id: LunchRecordId) -> RepositoryResult<usize> {
    use crate::schema::lunch_records;

    Ok(diesel::delete(lunch_records::table.find(id.get())).execute(conn)?)
}

fn delete_all(conn: &mut SqliteConnection) -> RepositoryResult<usize> {
    use crate::schema::lunch_records;

    Ok(diesel::delete(lunch_records::table).execute(conn)?)
}

impl LunchRecordReader for DieselRepository {
    fn list_lunch_records(&self) -> RepositoryResult<Vec<LunchRecord>> {
        let mut conn = self.conn()?;
        list_all(&mut conn)
    }

    fn list_lunch_records_by_group(
        &self,
        group: &LunchRecordGroup,
    ) -> RepositoryResult<Vec<LunchRecord>> {
        let mut conn = self.conn()?;
        list_by_group(&mut conn, group)
    }

    fn get_lunch_record_by_id(&self, id: LunchRecordId) -> RepositoryResult<LunchRecord> {
        let mut conn = self.conn()?;
        get_by_id(&mut conn, id)
    }
}

impl LunchRecordWriter for DieselRepository {
    fn create_lunch_record(&self, record: &NewLunchRecord) -> RepositoryResult<LunchRecord> {
        let mut conn = self.conn()?;
        insert(&mut conn, record)
    }

    fn update_lunch_record(
        &self,
        id: LunchRecordId,
        changes: &LunchRecordChanges,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        update_fields(&mut conn, id, changes)
    }

    fn update_average_grade_by_group(
        &self,
        average: AverageGrade,
        group: &LunchRecordGroup,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        update_average(&mut conn, average, group)
    }

    fn delete_lunch_record(&self, id: LunchRecordId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        delete_one(&mut conn, id)
    }

    fn delete_all_lunch_records(&self) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        delete_all(&mut conn)
    }
}

impl UnitOfWork for DieselRepository {
    fn atomically<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn LunchRecordStore) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.conn()?;

        conn.transaction::<T, Rollback<E>, _>(|conn| {
            let store = DieselTransaction::new(conn);
            f(&store).map_err(Rollback::Aborted)
        })
        .map_err(|e| match e {
            Rollback::Aborted(e) => {
                log::info!("transaction rolled back");
                e
            }
            Rollback::Database(e) => E::from(RepositoryError::from(e)),
        })
    }
}

impl LunchRecordReader for DieselTransaction<'_> {
    fn list_lunch_records(&self) -> RepositoryResult<Vec<LunchRecord>> {
        list_all(&mut self.conn.borrow_mut())
    }

    fn list_lunch_records_by_group(
        &self,
        group: &LunchRecordGroup,
    ) -> RepositoryResult<Vec<LunchRecord>> {
        list_by_group(&mut self.conn.borrow_mut(), group)
    }

    fn get_lunch_record_by_id(&self, id: LunchRecordId) -> RepositoryResult<LunchRecord> {
        get_by_id(&mut self.conn.borrow_mut(), id)
    }
}

impl LunchRecordWriter for DieselTransaction<'_> {
    fn create_lunch_record(&self, record: &NewLunchRecord) -> RepositoryResult<LunchRecord> {
        insert(&mut self.conn.borrow_mut(), record)
    }

    fn update_lunch_record(
        &self,
        id: LunchRecordId,
        changes: &LunchRecordChanges,
    ) -> RepositoryResult<usize> {
        update_fields(&mut self.conn.borrow_mut(), id, changes)
    }

    fn update_average_grade_by_group(
        &self,
        average: AverageGrade,
        group: &LunchRecordGroup,
    ) -> RepositoryResult<usize> {
        update_average(&mut self.conn.borrow_mut(), average, group)
    }

    fn delete_lunch_record(&self, id: LunchRecordId) -> RepositoryResult<usize> {
        delete_one(&mut self.conn.borrow_mut(), id)
    }

    fn delete_all_lunch_records(&self) -> RepositoryResult<usize> {
        delete_all(&mut self.conn.borrow_mut())
    }
}
