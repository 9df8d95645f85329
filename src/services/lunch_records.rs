//! Persisting ratings: creation with oversized-text recovery and in-place
//! corrections.

use crate::domain::lunch_record::{LunchRecord, LunchRecordChanges, NewLunchRecord};
use crate::domain::text::MAX_TEXT_BYTES;
use crate::domain::types::{AverageGrade, LunchRecordId};
use crate::repository::errors::RepositoryError;
use crate::repository::{LunchRecordStore, UnitOfWork};
use crate::services::grades::{GradeCandidate, average_grade_for};

use super::ServiceResult;

/// Insert `record`, retrying once with shortened text when the store reports
/// a value as too long.
///
/// On that retry `restaurant` and `menu` are cut to [`MAX_TEXT_BYTES`] encoded
/// bytes in place, so the caller sees the values that were actually stored.
/// Any other failure, and any failure of the retry, is returned unchanged.
pub fn insert_with_recovery(
    record: &mut NewLunchRecord,
    store: &dyn LunchRecordStore,
) -> ServiceResult<LunchRecord> {
    match store.create_lunch_record(record) {
        Ok(saved) => {
            log::info!("saved lunch record {}", saved.id);
            Ok(saved)
        }
        Err(RepositoryError::FieldTooLong { code, source }) => {
            log::info!("errorCode={code}, cause: {source}");

            record.truncate_text_fields(MAX_TEXT_BYTES);
            log::info!(
                "retrying with restaurant={}, menu={}",
                record.restaurant,
                record.menu
            );

            let saved = store.create_lunch_record(record)?;
            log::info!("saved lunch record {} after truncation", saved.id);
            Ok(saved)
        }
        Err(e) => {
            log::error!("Data access failure while saving lunch record: {e}");
            Err(e.into())
        }
    }
}

/// Persist a brand-new record in one unit of work.
///
/// See [`insert_with_recovery`] for the oversized-text handling. Either the
/// record is stored with its final field values or nothing is stored.
pub fn create_lunch_record<U>(record: &mut NewLunchRecord, uow: &U) -> ServiceResult<LunchRecord>
where
    U: UnitOfWork,
{
    uow.atomically(|store| insert_with_recovery(record, store))
}

/// Stamp `record` with its contribution to the group average and persist it.
///
/// Only the new record carries the fresh average; the other members of its
/// group catch up on the next reconciliation.
pub fn record_lunch<U>(record: &mut NewLunchRecord, uow: &U) -> ServiceResult<LunchRecord>
where
    U: UnitOfWork,
{
    uow.atomically(|store| {
        let average = average_grade_for(GradeCandidate::New(record), store)?;
        record.average_grade = average;
        insert_with_recovery(record, store)
    })
}

/// Apply `changes` to the stored record `id` and refresh its group's average.
///
/// The new average is computed with the corrected grade before anything is
/// written; every member of the record's (possibly new) group receives it.
/// Returns the average that was stored.
pub fn correct_lunch_record<U>(
    id: LunchRecordId,
    changes: &LunchRecordChanges,
    uow: &U,
) -> ServiceResult<AverageGrade>
where
    U: UnitOfWork,
{
    uow.atomically(|store| {
        let mut record = store.get_lunch_record_by_id(id)?;
        record.apply(changes);

        let average = average_grade_for(GradeCandidate::Correction(&record), store)?;

        store.update_lunch_record(id, changes)?;
        store.update_average_grade_by_group(average, &record.group())?;
        Ok(average)
    })
}
