//! Error types for context operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors during settings persistence
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to save settings")]
    Save(#[source] confy::ConfyError),

    #[error("failed to save settings to {path}")]
    SaveTo {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },
}
