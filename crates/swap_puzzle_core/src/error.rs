//! Error types for the puzzle core.

use derive_more::{Display, Error};
use tracing::instrument;

/// Invalid grid construction (bad side length or a non-permutation arrangement).
#[derive(Debug, Clone, Display, Error)]
#[display("Grid error: {} at {}:{}", message, file, line)]
pub struct GridError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GridError {
    /// Creates a new grid error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Failure of the persistence collaborator behind the record store.
#[derive(Debug, Clone, Display, Error)]
#[display("Record store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
