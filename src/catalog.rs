//! Level catalog loaded once at startup from JSON.

use std::collections::HashSet;
use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Deserializer, Serialize};
use swap_puzzle_core::LevelId;
use tracing::{debug, info, instrument};

/// A playable level: an image to slice and a title for the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Level {
    /// Level identifier; numeric ids in the JSON are kept as their decimal form.
    #[serde(deserialize_with = "level_id_from_string_or_number")]
    id: LevelId,

    /// Image reference (path or URL).
    #[serde(rename = "img", alias = "image")]
    image: String,

    /// Gallery title.
    #[serde(default)]
    title: String,
}

impl Level {
    /// Creates a level.
    pub fn new(id: impl Into<LevelId>, image: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            title: title.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevelId {
    Text(String),
    Number(i64),
}

fn level_id_from_string_or_number<'de, D>(deserializer: D) -> Result<LevelId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawLevelId::deserialize(deserializer)? {
        RawLevelId::Text(id) => LevelId::new(id),
        RawLevelId::Number(id) => LevelId::new(id.to_string()),
    })
}

/// Ordered list of levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Creates a catalog from levels in play order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if two levels share an id.
    #[instrument(skip(levels), fields(count = levels.len()))]
    pub fn new(levels: Vec<Level>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for level in &levels {
            if !seen.insert(level.id.clone()) {
                return Err(CatalogError::new(format!("Duplicate level id '{}'", level.id)));
            }
        }
        Ok(Self { levels })
    }

    /// Parses a catalog from a JSON array of `{ id, img, title }` objects.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the JSON is malformed or ids repeat.
    #[instrument(skip(json), fields(bytes = json.len()))]
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let levels: Vec<Level> = serde_json::from_str(json)
            .map_err(|e| CatalogError::new(format!("Failed to parse level catalog: {}", e)))?;
        Self::new(levels)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        debug!("Loading level catalog");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CatalogError::new(format!("Failed to read level catalog: {}", e)))?;
        let catalog = Self::from_json(&content)?;
        info!(levels = catalog.len(), "Level catalog loaded");
        Ok(catalog)
    }

    /// Levels in play order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level ids in play order.
    pub fn ids(&self) -> Vec<LevelId> {
        self.levels.iter().map(|level| level.id.clone()).collect()
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True when the catalog has no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Looks up a level by id.
    pub fn get(&self, id: &LevelId) -> Option<&Level> {
        self.levels.iter().find(|level| &level.id == id)
    }

    /// Index of a level in play order.
    pub fn position(&self, id: &LevelId) -> Option<usize> {
        self.levels.iter().position(|level| &level.id == id)
    }

    /// The level after `id`, wrapping to the first after the last.
    ///
    /// Unknown ids (such as the custom-image id) lead to the first level.
    #[instrument(skip(self))]
    pub fn next_after(&self, id: &LevelId) -> Option<&Level> {
        if self.levels.is_empty() {
            return None;
        }
        let next = self.position(id).map_or(0, |index| (index + 1) % self.levels.len());
        self.levels.get(next)
    }
}

/// Level catalog error.
#[derive(Debug, Clone, Display, Error)]
#[display("Catalog error: {} at {}:{}", message, file, line)]
pub struct CatalogError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CatalogError {
    /// Creates a new catalog error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
