//! Record store: the in-memory record map and its persistence collaborator.
//!
//! Records are read from persistence once, when the store opens, and written
//! back after every improving result. Persistence failures never reach the
//! caller during play. A failed load starts from an empty map and detaches the
//! store from persistence for the rest of the session, so the stored history
//! is never overwritten by a partial view of it. A failed save keeps the
//! in-memory record and stays pending until the next write or an explicit
//! [`RecordStore::flush`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;
use crate::record::{LevelId, LevelRecord, RecordMap, RecordOutcome};

/// Durable storage for the record map.
pub trait RecordPersistence: std::fmt::Debug + Send {
    /// Reads every stored record.
    fn load(&self) -> Result<RecordMap, StoreError>;

    /// Replaces the stored records with `records`.
    fn save(&self, records: &RecordMap) -> Result<(), StoreError>;
}

/// Persistence held in process memory.
///
/// Clones share the same storage, so a test can keep one handle and give
/// another to a [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    records: Arc<Mutex<RecordMap>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryPersistence {
    /// Creates empty in-memory persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates in-memory persistence pre-populated with records.
    pub fn with_records(records: RecordMap) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl RecordPersistence for MemoryPersistence {
    fn load(&self) -> Result<RecordMap, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::new("In-memory record storage is poisoned"))?;
        Ok(records.clone())
    }

    fn save(&self, records: &RecordMap) -> Result<(), StoreError> {
        let mut stored = self
            .records
            .lock()
            .map_err(|_| StoreError::new("In-memory record storage is poisoned"))?;
        *stored = records.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Best result per level, backed by a persistence collaborator.
#[derive(Debug)]
pub struct RecordStore {
    records: RecordMap,
    persistence: Box<dyn RecordPersistence>,
    attached: bool,
    save_pending: bool,
}

impl RecordStore {
    /// Opens a store, reading all records from `persistence` once.
    ///
    /// If the read fails the store starts empty, keeps records in memory
    /// only, and never writes to `persistence`.
    #[instrument(skip(persistence))]
    pub fn open(persistence: impl RecordPersistence + 'static) -> Self {
        let (records, attached) = match persistence.load() {
            Ok(records) => {
                info!(count = records.len(), "Records loaded");
                (records, true)
            }
            Err(e) => {
                warn!(error = %e, "Record persistence unavailable, keeping records in memory only");
                (RecordMap::new(), false)
            }
        };

        Self {
            records,
            persistence: Box::new(persistence),
            attached,
            save_pending: false,
        }
    }

    /// Opens a store backed only by process memory.
    #[instrument]
    pub fn in_memory() -> Self {
        Self::open(MemoryPersistence::new())
    }

    /// Compares a finished run against the stored record and keeps the better one.
    ///
    /// The run replaces the record when the level has none, when it used
    /// fewer moves, or when it tied on moves with less time. Runs that do not
    /// improve cause no write at all.
    #[instrument(skip(self), fields(level_id = %level_id))]
    pub fn compare_and_store(&mut self, level_id: &LevelId, time: u32, moves: u32) -> RecordOutcome {
        let run = LevelRecord::new(time, moves);
        let previous = self.records.get(level_id).copied();

        let improved = match previous {
            None => true,
            Some(existing) => run.beats(&existing),
        };

        if !improved {
            debug!(?previous, "Run did not beat the stored record");
            return RecordOutcome { previous, improved };
        }

        self.records.insert(level_id.clone(), run);
        info!(time, moves, ?previous, "New record stored");
        self.persist();

        RecordOutcome { previous, improved }
    }

    /// Returns the earliest level in `levels` without a record.
    ///
    /// When every level has a record the first level is returned, so play
    /// restarts from the top. Returns `None` only for an empty list.
    #[instrument(skip(self, levels), fields(count = levels.len()))]
    pub fn first_incomplete_level<'a>(&self, levels: &'a [LevelId]) -> Option<&'a LevelId> {
        levels
            .iter()
            .find(|id| !self.records.contains_key(*id))
            .or_else(|| levels.first())
    }

    /// Gets the record for a level.
    pub fn record(&self, level_id: &LevelId) -> Option<LevelRecord> {
        self.records.get(level_id).copied()
    }

    /// Returns every record.
    pub fn records(&self) -> &RecordMap {
        &self.records
    }

    /// True once any level has been completed.
    pub fn has_progress(&self) -> bool {
        !self.records.is_empty()
    }

    /// False when the initial load failed and records live in memory only.
    pub fn is_persistent(&self) -> bool {
        self.attached
    }

    /// True when the last write to persistence failed and has not been retried successfully.
    pub fn is_save_pending(&self) -> bool {
        self.save_pending
    }

    /// Retries a pending write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if persistence still rejects the write. The
    /// in-memory records are unaffected either way.
    #[instrument(skip(self))]
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.attached || !self.save_pending {
            return Ok(());
        }
        self.persistence.save(&self.records)?;
        self.save_pending = false;
        info!(count = self.records.len(), "Pending records flushed");
        Ok(())
    }

    fn persist(&mut self) {
        if !self.attached {
            debug!("Store detached from persistence, record kept in memory");
            return;
        }
        match self.persistence.save(&self.records) {
            Ok(()) => {
                self.save_pending = false;
                debug!(count = self.records.len(), "Records persisted");
            }
            Err(e) => {
                self.save_pending = true;
                warn!(error = %e, "Failed to persist records, keeping them in memory");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<LevelId> {
        names.iter().copied().map(LevelId::from).collect()
    }

    #[test]
    fn test_first_completion_is_always_improvement() {
        let mut store = RecordStore::in_memory();
        let outcome = store.compare_and_store(&LevelId::from("a"), 90, 30);
        assert_eq!(
            outcome,
            RecordOutcome {
                previous: None,
                improved: true
            }
        );
        assert_eq!(store.record(&LevelId::from("a")), Some(LevelRecord::new(90, 30)));
    }

    #[test]
    fn test_policy_examples() {
        let level = LevelId::from("a");
        let seeded = RecordMap::from([(level.clone(), LevelRecord::new(60, 20))]);

        for (time, moves, expected) in [(70, 19, true), (50, 21, false), (55, 20, true), (60, 20, false)] {
            let mut store = RecordStore::open(MemoryPersistence::with_records(seeded.clone()));
            let outcome = store.compare_and_store(&level, time, moves);
            assert_eq!(outcome.improved, expected, "time={time} moves={moves}");
            assert_eq!(outcome.previous, Some(LevelRecord::new(60, 20)));
        }
    }

    #[test]
    fn test_first_incomplete_level() {
        let levels = ids(&["A", "B", "C"]);
        let mut store = RecordStore::in_memory();
        store.compare_and_store(&levels[0], 10, 5);
        assert_eq!(store.first_incomplete_level(&levels), Some(&levels[1]));

        store.compare_and_store(&levels[1], 10, 5);
        store.compare_and_store(&levels[2], 10, 5);
        assert_eq!(store.first_incomplete_level(&levels), Some(&levels[0]));
    }

    #[test]
    fn test_first_incomplete_level_empty_list() {
        let store = RecordStore::in_memory();
        assert_eq!(store.first_incomplete_level(&[]), None);
    }

    #[test]
    fn test_in_memory_store_is_persistent() {
        assert!(RecordStore::in_memory().is_persistent());
    }

    #[test]
    fn test_has_progress() {
        let mut store = RecordStore::in_memory();
        assert!(!store.has_progress());
        store.compare_and_store(&LevelId::from("a"), 1, 1);
        assert!(store.has_progress());
    }
}
