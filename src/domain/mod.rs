pub mod lunch_record;
pub mod text;
pub mod types;
