use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AverageGrade, Grade, LunchPrice, LunchRecordId, MenuName, RestaurantName,
};

/// One rating event stored for a restaurant visit.
///
/// `average_grade` is derived data: it holds the mean grade of every record in
/// the same [`LunchRecordGroup`] as of the last contribution or reconciliation
/// and is overwritten by the aggregation services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LunchRecord {
    pub id: LunchRecordId,
    pub restaurant: RestaurantName,
    pub menu: MenuName,
    pub image: Vec<u8>,
    pub price: LunchPrice,
    pub grade: Grade,
    pub average_grade: AverageGrade,
    pub update_at: NaiveTime,
    pub create_at: NaiveTime,
}

impl LunchRecord {
    /// Key of the group this record is averaged with.
    pub fn group(&self) -> LunchRecordGroup {
        LunchRecordGroup::new(self.restaurant.clone(), self.menu.clone())
    }

    /// Overwrite the user-editable fields with `changes`.
    pub fn apply(&mut self, changes: &LunchRecordChanges) {
        self.restaurant = changes.restaurant.clone();
        self.menu = changes.menu.clone();
        self.image = changes.image.clone();
        self.price = changes.price;
        self.grade = changes.grade;
    }
}

/// Candidate record that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewLunchRecord {
    pub restaurant: RestaurantName,
    pub menu: MenuName,
    pub image: Vec<u8>,
    pub price: LunchPrice,
    pub grade: Grade,
    pub average_grade: AverageGrade,
    pub update_at: NaiveTime,
    pub create_at: NaiveTime,
}

impl NewLunchRecord {
    /// Build a candidate stamped with the current local time of day.
    pub fn new(
        restaurant: RestaurantName,
        menu: MenuName,
        image: Vec<u8>,
        price: LunchPrice,
        grade: Grade,
    ) -> Self {
        let now = Local::now().time();
        Self {
            restaurant,
            menu,
            image,
            price,
            grade,
            average_grade: AverageGrade::ZERO,
            update_at: now,
            create_at: now,
        }
    }

    /// Key of the group this candidate would join.
    pub fn group(&self) -> LunchRecordGroup {
        LunchRecordGroup::new(self.restaurant.clone(), self.menu.clone())
    }

    /// Shrink `restaurant` and `menu` to at most `max_bytes` encoded bytes each.
    pub fn truncate_text_fields(&mut self, max_bytes: usize) {
        self.restaurant.truncate_to_bytes(max_bytes);
        self.menu.truncate_to_bytes(max_bytes);
    }
}

/// Field values written by a correction of an existing record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LunchRecordChanges {
    pub restaurant: RestaurantName,
    pub menu: MenuName,
    pub image: Vec<u8>,
    pub price: LunchPrice,
    pub grade: Grade,
}

impl From<&LunchRecord> for LunchRecordChanges {
    fn from(record: &LunchRecord) -> Self {
        Self {
            restaurant: record.restaurant.clone(),
            menu: record.menu.clone(),
            image: record.image.clone(),
            price: record.price,
            grade: record.grade,
        }
    }
}

/// Composite `(restaurant, menu)` key used to bucket records for averaging.
///
/// Two records share a group only when both names are byte-for-byte equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LunchRecordGroup {
    restaurant: RestaurantName,
    menu: MenuName,
}

impl LunchRecordGroup {
    pub fn new(restaurant: RestaurantName, menu: MenuName) -> Self {
        Self { restaurant, menu }
    }

    pub fn restaurant(&self) -> &RestaurantName {
        &self.restaurant
    }

    pub fn menu(&self) -> &MenuName {
        &self.menu
    }
}

impl std::fmt::Display for LunchRecordGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.restaurant, self.menu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn candidate(restaurant: &str, menu: &str) -> NewLunchRecord {
        NewLunchRecord::new(
            RestaurantName::new(restaurant).unwrap(),
            MenuName::new(menu).unwrap(),
            vec![],
            LunchPrice::new(Decimal::new(9000, 0)).unwrap(),
            Grade::new(4.0).unwrap(),
        )
    }

    #[test]
    fn groups_compare_case_sensitively() {
        let a = candidate("Mapo", "Jjamppong").group();
        let b = candidate("Mapo", "jjamppong").group();
        let c = candidate("Mapo", "Jjamppong").group();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn new_candidates_start_without_average() {
        let record = candidate("Mapo", "Jjamppong");
        assert_eq!(record.average_grade, AverageGrade::ZERO);
        assert_eq!(record.update_at, record.create_at);
    }

    #[test]
    fn truncates_both_text_fields() {
        let mut record = candidate(&"식".repeat(100), &"m".repeat(256));
        record.truncate_text_fields(255);
        assert_eq!(record.restaurant.byte_len(), 255);
        assert_eq!(record.menu.byte_len(), 255);
    }

    #[test]
    fn serializes_to_plain_values() {
        let record = candidate("Mapo", "Jjamppong");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["restaurant"], "Mapo");
        assert_eq!(value["grade"], 4.0);
    }
}
