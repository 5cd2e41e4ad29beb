//! SQLite persistence for level records.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{NewStoredRecord, StoredRecord};
pub use repository::SqliteRecordRepository;
