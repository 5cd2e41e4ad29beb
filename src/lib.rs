//! Swap Puzzle library - level catalog, record persistence and the play loop
//!
//! Game rules live in [`swap_puzzle_core`]; this crate wires them to the
//! outside world.
//!
//! # Architecture
//!
//! - **Catalog**: levels loaded from a JSON file
//! - **Database**: SQLite-backed [`RecordPersistence`] via diesel
//! - **Gallery**: per-level badges and best results
//! - **Settings**: difficulty and audio preferences in TOML
//! - **Play**: line-driven loop over a [`SessionController`]
//!
//! # Example
//!
//! ```no_run
//! use swap_puzzle::{LevelCatalog, RecordStore, SessionController, SqliteRecordRepository};
//!
//! # fn example() -> anyhow::Result<()> {
//! let catalog = LevelCatalog::from_file("levels.json")?;
//! let repository = SqliteRecordRepository::open("swap_puzzle.db")?;
//! let mut controller = SessionController::new(RecordStore::open(repository));
//!
//! let ids = catalog.ids();
//! if let Some(level) = controller.records().first_incomplete_level(&ids).cloned() {
//!     controller.start(level, 4);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
mod db;
mod gallery;
mod play;
mod settings;

pub use catalog::{CatalogError, Level, LevelCatalog};
pub use db::{DbError, NewStoredRecord, SqliteRecordRepository, StoredRecord};
pub use gallery::{Gallery, GalleryEntry, start_label};
pub use play::{CommandError, PlayCommand, PlayLoop, Step, run as run_play_loop};
pub use settings::{GameSettings, SettingsError};

pub use swap_puzzle_core::{
    Difficulty, Grid, LevelId, LevelRecord, MemoryPersistence, RecordMap, RecordOutcome, RecordPersistence,
    RecordStore, Session, SessionController, SessionPhase, SessionSnapshot, StoreError, SwapOutcome,
    SwapRejection, format_clock,
};
