//! Per-level best results and the policy for replacing them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::clock::format_clock;

/// Identifier of a level in the catalog.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct LevelId(String);

impl LevelId {
    /// Id reserved for user-supplied images, kept apart from catalog levels.
    pub const CUSTOM: &'static str = "custom";

    /// Creates a level id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id used for user-supplied images.
    pub fn custom() -> Self {
        Self::new(Self::CUSTOM)
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LevelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Best result recorded for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Elapsed time in whole seconds.
    time: u32,
    /// Number of swaps made.
    moves: u32,
}

impl LevelRecord {
    /// Creates a record from elapsed seconds and move count.
    pub fn new(time: u32, moves: u32) -> Self {
        Self { time, moves }
    }

    /// Elapsed time in seconds.
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Number of swaps.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Ranks this result against an existing record.
    ///
    /// Fewer moves wins; equal moves fall back to less time. A tie on both
    /// is not an improvement.
    #[instrument]
    pub fn beats(&self, existing: &LevelRecord) -> bool {
        self.moves < existing.moves || (self.moves == existing.moves && self.time < existing.time)
    }

    /// Elapsed time as `MM:SS`.
    pub fn display_time(&self) -> String {
        format_clock(self.time)
    }
}

impl std::fmt::Display for LevelRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} in {} moves", self.display_time(), self.moves)
    }
}

/// All stored records, keyed by level.
pub type RecordMap = BTreeMap<LevelId, LevelRecord>;

/// Result of comparing a finished run against the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// The record held before this run, if the level had been completed.
    pub previous: Option<LevelRecord>,
    /// Whether this run replaced the stored record.
    pub improved: bool,
}

impl RecordOutcome {
    /// The best result after this run: the run itself when it improved, the previous record otherwise.
    pub fn best(&self, run: LevelRecord) -> LevelRecord {
        match self.previous {
            Some(previous) if !self.improved => previous,
            _ => run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fewer_moves_beats_slower_time() {
        let existing = LevelRecord::new(60, 20);
        assert!(LevelRecord::new(70, 19).beats(&existing));
    }

    #[test]
    fn test_more_moves_never_beats() {
        let existing = LevelRecord::new(60, 20);
        assert!(!LevelRecord::new(50, 21).beats(&existing));
    }

    #[test]
    fn test_equal_moves_faster_time_beats() {
        let existing = LevelRecord::new(60, 20);
        assert!(LevelRecord::new(55, 20).beats(&existing));
    }

    #[test]
    fn test_full_tie_is_not_improvement() {
        let existing = LevelRecord::new(60, 20);
        assert!(!LevelRecord::new(60, 20).beats(&existing));
    }

    #[test]
    fn test_best_prefers_previous_when_not_improved() {
        let previous = LevelRecord::new(30, 10);
        let run = LevelRecord::new(40, 12);
        let outcome = RecordOutcome {
            previous: Some(previous),
            improved: false,
        };
        assert_eq!(outcome.best(run), previous);
    }

    #[test]
    fn test_level_id_display_and_custom() {
        let id = LevelId::from("forest");
        assert_eq!(id.to_string(), "forest");
        assert_eq!(LevelId::custom().as_str(), "custom");
    }
}
