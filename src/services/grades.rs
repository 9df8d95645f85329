//! Average-grade aggregation.
//!
//! Computes the contribution of a single rating to its group's mean and
//! reconciles the stored averages of every group from the raw grades.

use std::collections::HashMap;

use crate::domain::lunch_record::{LunchRecord, LunchRecordGroup, NewLunchRecord};
use crate::domain::types::{AverageGrade, Grade, LunchRecordId};
use crate::repository::{LunchRecordReader, UnitOfWork};

use super::{ServiceError, ServiceResult};

/// A rating whose contribution to its group average should be computed.
#[derive(Debug, Clone, Copy)]
pub enum GradeCandidate<'a> {
    /// A rating that has not been stored yet.
    New(&'a NewLunchRecord),
    /// A corrected grade for a stored record.
    Correction(&'a LunchRecord),
}

impl GradeCandidate<'_> {
    fn group(&self) -> LunchRecordGroup {
        match self {
            GradeCandidate::New(record) => record.group(),
            GradeCandidate::Correction(record) => record.group(),
        }
    }

    fn grade(&self) -> Grade {
        match self {
            GradeCandidate::New(record) => record.grade,
            GradeCandidate::Correction(record) => record.grade,
        }
    }
}

/// Fail when any record carries a grade of exactly `0.0`.
///
/// Records are checked in the order given and the first offender is reported.
/// Both the contribution and the reconciliation paths run this before
/// averaging anything.
pub fn ensure_consistent(records: &[LunchRecord]) -> ServiceResult<()> {
    match records.iter().find(|record| record.grade.is_zero()) {
        Some(record) => Err(ServiceError::StateInconsistency(format!(
            "average-grade computation aborted: record {} has a zero grade",
            record.id
        ))),
        None => Ok(()),
    }
}

/// Mean grade of the candidate's group as if the candidate were already
/// applied. Nothing is written.
///
/// A new candidate is added to the stored members; a correction replaces the
/// grade of the member with the same id. A correction whose id is not among
/// the stored members of a non-empty group fails with
/// [`ServiceError::InvalidArgument`].
pub fn average_grade_for<R>(candidate: GradeCandidate<'_>, repo: &R) -> ServiceResult<AverageGrade>
where
    R: LunchRecordReader + ?Sized,
{
    let group = candidate.group();
    let members = repo.list_lunch_records_by_group(&group)?;
    ensure_consistent(&members)?;

    if members.is_empty() {
        return Ok(AverageGrade::from(candidate.grade()));
    }

    let mut grades: Vec<Grade> = members.iter().map(|record| record.grade).collect();
    match candidate {
        GradeCandidate::New(record) => grades.push(record.grade),
        GradeCandidate::Correction(record) => {
            let position = position_of(&members, record.id).ok_or_else(|| {
                ServiceError::InvalidArgument(format!(
                    "lunch record {} is not part of group {group}",
                    record.id
                ))
            })?;
            grades[position] = record.grade;
        }
    }

    AverageGrade::mean_of(grades).ok_or_else(|| {
        ServiceError::StateInconsistency(format!("group {group} has no grades to average"))
    })
}

fn position_of(members: &[LunchRecord], id: LunchRecordId) -> Option<usize> {
    members.iter().position(|member| member.id == id)
}

/// Bucket records by their `(restaurant, menu)` key.
pub fn group_grades(records: &[LunchRecord]) -> HashMap<LunchRecordGroup, Vec<Grade>> {
    let mut groups: HashMap<LunchRecordGroup, Vec<Grade>> = HashMap::new();
    for record in records {
        groups.entry(record.group()).or_default().push(record.grade);
    }
    groups
}

/// Recompute and store the average grade of every group in one unit of work.
///
/// Returns the number of groups written. An empty store surfaces as
/// `RepositoryError::NotFound`, and a zero grade anywhere in the store aborts
/// the whole pass; either way nothing is committed.
pub fn correct_average_grades<U>(uow: &U) -> ServiceResult<usize>
where
    U: UnitOfWork,
{
    uow.atomically(|store| {
        let all = store.list_lunch_records()?;
        let groups = group_grades(&all);

        for (group, grades) in &groups {
            ensure_consistent(&all)?;
            let average = AverageGrade::mean_of(grades.iter().copied()).ok_or_else(|| {
                ServiceError::StateInconsistency(format!("group {group} has no grades to average"))
            })?;
            log::info!(
                "restaurant={}, menu={}, averageGrade={average}",
                group.restaurant(),
                group.menu()
            );
            store.update_average_grade_by_group(average, group)?;
        }

        Ok(groups.len())
    })
    .inspect_err(|e| log::error!("Failed to correct average grades: {e}"))
}
