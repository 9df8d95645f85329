//! Helpers for integration tests.

use chrono::NaiveTime;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use lunch_record::db::{DbPool, establish_connection_pool};
use lunch_record::domain::lunch_record::NewLunchRecord;
use lunch_record::domain::types::{AverageGrade, Grade, LunchPrice, MenuName, RestaurantName};
use rust_decimal::Decimal;
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

/// A candidate record with a fixed time of day and price.
pub fn new_lunch_record(restaurant: &str, menu: &str, grade: f32) -> NewLunchRecord {
    let noon = NaiveTime::from_hms_opt(12, 15, 0).expect("valid time");
    NewLunchRecord {
        restaurant: RestaurantName::new(restaurant).expect("valid restaurant"),
        menu: MenuName::new(menu).expect("valid menu"),
        image: vec![0x89, 0x50, 0x4E, 0x47],
        price: LunchPrice::new(Decimal::new(950050, 2)).expect("valid price"),
        grade: Grade::new(grade).expect("valid grade"),
        average_grade: AverageGrade::ZERO,
        update_at: noon,
        create_at: noon,
    }
}
