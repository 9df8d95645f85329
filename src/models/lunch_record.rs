use chrono::NaiveTime;
use diesel::prelude::*;

use crate::domain::lunch_record::{
    LunchRecord as DomainLunchRecord, LunchRecordChanges as DomainLunchRecordChanges,
    NewLunchRecord as DomainNewLunchRecord,
};
use crate::domain::types::{
    AverageGrade, Grade, LunchPrice, MenuName, RestaurantName, TypeConstraintError,
};

/// Diesel model representing a row in the `lunch_records` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::lunch_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LunchRecord {
    pub id: i32,
    pub restaurant: String,
    pub menu: String,
    pub image: Vec<u8>,
    pub price: String,
    pub grade: f32,
    pub average_grade: f32,
    pub update_at: NaiveTime,
    pub create_at: NaiveTime,
}

/// Insertable form of [`LunchRecord`] used for creating new rows.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::lunch_records)]
pub struct NewLunchRecord<'a> {
    pub restaurant: &'a str,
    pub menu: &'a str,
    pub image: &'a [u8],
    pub price: String,
    pub grade: f32,
    pub average_grade: f32,
    pub update_at: NaiveTime,
    pub create_at: NaiveTime,
}

/// Changeset applied when a record is corrected in place.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::lunch_records)]
pub struct LunchRecordChanges<'a> {
    pub restaurant: &'a str,
    pub menu: &'a str,
    pub image: &'a [u8],
    pub price: String,
    pub grade: f32,
    pub update_at: NaiveTime,
}

impl TryFrom<LunchRecord> for DomainLunchRecord {
    type Error = TypeConstraintError;

    fn try_from(record: LunchRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id.try_into()?,
            restaurant: RestaurantName::new(record.restaurant)?,
            menu: MenuName::new(record.menu)?,
            image: record.image,
            price: record.price.parse::<LunchPrice>()?,
            grade: Grade::new(record.grade)?,
            average_grade: AverageGrade::new(record.average_grade)?,
            update_at: record.update_at,
            create_at: record.create_at,
        })
    }
}

impl<'a> From<&'a DomainNewLunchRecord> for NewLunchRecord<'a> {
    fn from(record: &'a DomainNewLunchRecord) -> Self {
        Self {
            restaurant: record.restaurant.as_str(),
            menu: record.menu.as_str(),
            image: &record.image,
            price: record.price.to_string(),
            grade: record.grade.get(),
            average_grade: record.average_grade.get(),
            update_at: record.update_at,
            create_at: record.create_at,
        }
    }
}

impl<'a> LunchRecordChanges<'a> {
    /// Build the changeset, stamping `update_at` with `now`.
    pub fn new(changes: &'a DomainLunchRecordChanges, now: NaiveTime) -> Self {
        Self {
            restaurant: changes.restaurant.as_str(),
            menu: changes.menu.as_str(),
            image: &changes.image,
            price: changes.price.to_string(),
            grade: changes.grade.get(),
            update_at: now,
        }
    }
}
