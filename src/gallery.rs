//! Gallery view model: one card per level with its best result.

use derive_getters::Getters;
use swap_puzzle_core::{LevelId, LevelRecord, RecordStore};
use tracing::instrument;

use crate::catalog::LevelCatalog;

/// One gallery card.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GalleryEntry {
    index: usize,
    id: LevelId,
    title: String,
    image: String,
    record: Option<LevelRecord>,
}

impl GalleryEntry {
    /// True once the level has a record.
    pub fn is_completed(&self) -> bool {
        self.record.is_some()
    }

    /// Check mark for completed levels, the 1-based level number otherwise.
    pub fn badge(&self) -> String {
        if self.is_completed() {
            "✓".to_string()
        } else {
            (self.index + 1).to_string()
        }
    }

    /// Best time as `MM:SS`, or `--:--`.
    pub fn time_text(&self) -> String {
        self.record
            .map_or_else(|| "--:--".to_string(), |record| record.display_time())
    }

    /// Best move count, or `--`.
    pub fn moves_text(&self) -> String {
        self.record
            .map_or_else(|| "--".to_string(), |record| record.moves().to_string())
    }
}

/// Every level in catalog order, joined with its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    /// Builds the gallery from the catalog and the current records.
    #[instrument(skip(catalog, records), fields(levels = catalog.len()))]
    pub fn build(catalog: &LevelCatalog, records: &RecordStore) -> Self {
        let entries = catalog
            .levels()
            .iter()
            .enumerate()
            .map(|(index, level)| GalleryEntry {
                index,
                id: level.id().clone(),
                title: level.title().clone(),
                image: level.image().clone(),
                record: records.record(level.id()),
            })
            .collect();
        Self { entries }
    }

    /// Cards in catalog order.
    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    /// Number of completed levels.
    pub fn completed(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_completed()).count()
    }
}

impl std::fmt::Display for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            if entry.is_completed() {
                writeln!(
                    f,
                    "[{:>2}] {:<24} {}  {} moves",
                    entry.badge(),
                    entry.title,
                    entry.time_text(),
                    entry.moves_text()
                )?;
            } else {
                writeln!(f, "[{:>2}] {:<24} not completed yet", entry.badge(), entry.title)?;
            }
        }
        Ok(())
    }
}

/// Main menu label: "Continue" once anything has been completed, "Start" before.
pub fn start_label(records: &RecordStore) -> &'static str {
    if records.has_progress() { "Continue" } else { "Start" }
}
