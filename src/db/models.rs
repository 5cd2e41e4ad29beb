//! Database models for stored level records.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use swap_puzzle_core::{LevelId, LevelRecord};
use tracing::instrument;

use crate::db::{DbError, schema};

/// A level record row.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::level_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StoredRecord {
    level_id: String,
    time_seconds: i32,
    moves: i32,
    achieved_at: NaiveDateTime,
}

impl StoredRecord {
    /// Converts the row into a domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the row holds a negative time or move count.
    #[instrument(skip(self), fields(level_id = %self.level_id))]
    pub fn to_record(&self) -> Result<(LevelId, LevelRecord), DbError> {
        let time = u32::try_from(self.time_seconds)
            .map_err(|_| DbError::new(format!("Invalid time_seconds {} for level '{}'", self.time_seconds, self.level_id)))?;
        let moves = u32::try_from(self.moves)
            .map_err(|_| DbError::new(format!("Invalid moves {} for level '{}'", self.moves, self.level_id)))?;
        Ok((LevelId::new(self.level_id.clone()), LevelRecord::new(time, moves)))
    }

    /// True when the row already holds exactly this result.
    pub fn matches(&self, record: &LevelRecord) -> bool {
        i64::from(self.time_seconds) == i64::from(record.time()) && i64::from(self.moves) == i64::from(record.moves())
    }
}

/// Insertable level record; `achieved_at` defaults to the insert time.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::level_records)]
pub struct NewStoredRecord {
    level_id: String,
    time_seconds: i32,
    moves: i32,
}

impl NewStoredRecord {
    /// Builds an insertable row from a domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the time or move count exceeds the column range.
    #[instrument]
    pub fn from_record(level_id: &LevelId, record: &LevelRecord) -> Result<Self, DbError> {
        let time_seconds = i32::try_from(record.time())
            .map_err(|_| DbError::new(format!("Time {} too large to store", record.time())))?;
        let moves = i32::try_from(record.moves())
            .map_err(|_| DbError::new(format!("Move count {} too large to store", record.moves())))?;
        Ok(Self::new(level_id.as_str().to_string(), time_seconds, moves))
    }
}
