//! Settings persistence
//!
//! Re-exports the shared settings document from resonance-types and stores it
//! with confy (TOML). Loading never fails: a missing or unreadable document
//! yields the defaults.

pub use resonance_types::MeterSettings;

use std::path::{Path, PathBuf};

use super::error::ConfigError;

const APP_NAME: &str = "resonance";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// MeterSettings Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for MeterSettings persistence
pub trait SettingsExt: Sized {
    fn load() -> Self;
    fn load_from(path: &Path) -> Self;
    fn save(&self) -> Result<(), ConfigError>;
    fn save_to(&self, path: &Path) -> Result<(), ConfigError>;
}

impl SettingsExt for MeterSettings {
    fn load() -> Self {
        confy::load(APP_NAME, CONFIG_NAME).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Settings unreadable, using defaults");
            Self::default()
        })
    }

    fn load_from(path: &Path) -> Self {
        confy::load_path(path).unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Settings unreadable, using defaults"
            );
            Self::default()
        })
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(|source| ConfigError::SaveTo {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Where the engine reads and writes its settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SettingsStore {
    /// Platform config directory, managed by confy
    #[default]
    Default,
    File(PathBuf),
}

impl SettingsStore {
    pub fn load(&self) -> MeterSettings {
        match self {
            SettingsStore::Default => MeterSettings::load(),
            SettingsStore::File(path) => MeterSettings::load_from(path),
        }
    }

    pub fn save(&self, settings: &MeterSettings) -> Result<(), ConfigError> {
        match self {
            SettingsStore::Default => settings.save(),
            SettingsStore::File(path) => settings.save_to(path),
        }
    }
}
