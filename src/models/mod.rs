pub mod config;
pub mod lunch_record;
