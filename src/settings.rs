//! Player settings: difficulty and audio preferences, stored as TOML.

use std::path::Path;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use swap_puzzle_core::Difficulty;
use tracing::{debug, info, instrument, warn};

/// User-configurable settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Board size for new sessions.
    pub difficulty: Difficulty,
    /// Music volume in `0.0..=1.0`.
    pub volume: f32,
    /// Whether sound is muted.
    pub muted: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            volume: 0.5,
            muted: false,
        }
    }
}

impl GameSettings {
    /// Creates settings with defaults.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a TOML file; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file exists but cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::new(format!("Failed to read settings file: {}", e)))?;
        let mut settings: Self =
            toml::from_str(&content).map_err(|e| SettingsError::new(format!("Failed to parse settings: {}", e)))?;
        settings.set_volume(settings.volume);

        info!(difficulty = %settings.difficulty, muted = settings.muted, "Settings loaded");
        Ok(settings)
    }

    /// Writes settings to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if serialization or the write fails.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let content =
            toml::to_string(self).map_err(|e| SettingsError::new(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| SettingsError::new(format!("Failed to write settings file: {}", e)))?;
        debug!("Settings saved");
        Ok(())
    }

    /// Sets the volume, clamped to `0.0..=1.0` (NaN becomes the default).
    #[instrument(skip(self))]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            warn!("Volume is NaN, resetting to default");
            Self::default().volume
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    /// Flips mute and returns the new state.
    #[instrument(skip(self))]
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Volume actually applied to playback: zero while muted.
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }
}

/// Settings error.
#[derive(Debug, Clone, Display, Error)]
#[display("Settings error: {} at {}:{}", message, file, line)]
pub struct SettingsError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SettingsError {
    /// Creates a new settings error.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GameSettings::new();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.volume, 0.5);
        assert!(!settings.muted);
    }

    #[test]
    fn test_volume_clamped() {
        let mut settings = GameSettings::new();
        settings.set_volume(3.0);
        assert_eq!(settings.volume, 1.0);
        settings.set_volume(-1.0);
        assert_eq!(settings.volume, 0.0);
        settings.set_volume(f32::NAN);
        assert_eq!(settings.volume, 0.5);
    }

    #[test]
    fn test_toggle_mute_silences_playback() {
        let mut settings = GameSettings::new();
        assert!(settings.toggle_mute());
        assert_eq!(settings.effective_volume(), 0.0);
        assert!(!settings.toggle_mute());
        assert_eq!(settings.effective_volume(), 0.5);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: GameSettings = toml::from_str("difficulty = 3").expect("valid toml");
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.volume, 0.5);
    }

    #[test]
    fn test_invalid_difficulty_rejected() {
        assert!(toml::from_str::<GameSettings>("difficulty = 9").is_err());
    }
}
