//! Database repository for level records.

use std::collections::BTreeMap;

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use swap_puzzle_core::{LevelId, RecordMap, RecordPersistence, StoreError};
use tracing::{debug, info, instrument};

use crate::db::{DbError, NewStoredRecord, StoredRecord, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite repository holding one row per completed level.
#[derive(Debug, Clone)]
pub struct SqliteRecordRepository {
    db_path: String,
}

impl SqliteRecordRepository {
    /// Creates a repository for the database at the given path without touching it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating SqliteRecordRepository");
        Ok(Self { db_path })
    }

    /// Opens the database, creating it and applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path))]
    pub fn open(db_path: impl Into<String> + std::fmt::Debug) -> Result<Self, DbError> {
        let repository = Self::new(db_path.into())?;
        let mut conn = repository.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Failed to run migrations: {}", e)))?;
        info!(applied = applied.len(), "Migrations applied");
        Ok(repository)
    }

    /// Returns the database path.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Lists every stored row, ordered by level id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<StoredRecord>, DbError> {
        let mut conn = self.connection()?;
        let rows = schema::level_records::table
            .select(StoredRecord::as_select())
            .order(schema::level_records::level_id.asc())
            .load::<StoredRecord>(&mut conn)?;
        debug!(count = rows.len(), "Rows loaded");
        Ok(rows)
    }

    /// Gets the row for one level. Returns `None` if the level has no record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self), fields(level_id = %level_id))]
    pub fn get(&self, level_id: &LevelId) -> Result<Option<StoredRecord>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::level_records::table
            .filter(schema::level_records::level_id.eq(level_id.as_str()))
            .select(StoredRecord::as_select())
            .first::<StoredRecord>(&mut conn)
            .optional()?;
        Ok(row)
    }

    /// Reads all rows as a record map.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or a row is malformed.
    #[instrument(skip(self))]
    pub fn load_records(&self) -> Result<RecordMap, DbError> {
        let records = self
            .list()?
            .iter()
            .map(StoredRecord::to_record)
            .collect::<Result<RecordMap, DbError>>()?;
        info!(count = records.len(), "Records loaded from database");
        Ok(records)
    }

    /// Makes the table match `records` in one transaction.
    ///
    /// Rows whose result is unchanged keep their original `achieved_at`;
    /// changed rows are replaced; rows absent from `records` are deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; the table is left unchanged.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn replace_records(&self, records: &RecordMap) -> Result<(), DbError> {
        let rows: Vec<NewStoredRecord> = records
            .iter()
            .map(|(level_id, record)| NewStoredRecord::from_record(level_id, record))
            .collect::<Result<_, _>>()?;

        let mut conn = self.connection()?;
        conn.transaction::<_, DbError, _>(|conn| {
            let existing: BTreeMap<String, StoredRecord> = schema::level_records::table
                .select(StoredRecord::as_select())
                .load::<StoredRecord>(conn)?
                .into_iter()
                .map(|row| (row.level_id().clone(), row))
                .collect();

            let stale: Vec<String> = existing
                .keys()
                .filter(|id| !records.contains_key(&LevelId::new(id.as_str())))
                .cloned()
                .collect();
            let deleted = stale.len();
            if deleted > 0 {
                diesel::delete(schema::level_records::table.filter(schema::level_records::level_id.eq_any(stale)))
                    .execute(conn)?;
            }

            let mut written = 0usize;
            for (row, record) in rows.iter().zip(records.values()) {
                if existing.get(row.level_id()).is_some_and(|old| old.matches(record)) {
                    continue;
                }
                diesel::replace_into(schema::level_records::table)
                    .values(row)
                    .execute(conn)?;
                written += 1;
            }

            info!(written, deleted, "Records saved");
            Ok(())
        })
    }
}

impl RecordPersistence for SqliteRecordRepository {
    fn load(&self) -> Result<RecordMap, StoreError> {
        Ok(self.load_records()?)
    }

    fn save(&self, records: &RecordMap) -> Result<(), StoreError> {
        Ok(self.replace_records(records)?)
    }
}
