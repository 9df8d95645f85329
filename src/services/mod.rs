pub use self::errors::{ServiceError, ServiceResult};

pub mod errors;
pub mod grades;
pub mod lunch_records;
