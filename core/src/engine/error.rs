//! Error types for engine commands

use thiserror::Error;

use crate::backend::BackendError;
use crate::context::ConfigError;
use crate::dataset::EntityId;
use crate::session::InvalidCountdown;
use crate::snapshot::SnapshotError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend unavailable")]
    Backend(#[from] BackendError),

    #[error("snapshot failed")]
    Snapshot(#[from] SnapshotError),

    #[error("settings could not be saved")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Countdown(#[from] InvalidCountdown),

    #[error("{action} is not available while a snapshot is displayed")]
    Frozen { action: &'static str },

    #[error("entity {0} is not in the current view")]
    UnknownEntity(EntityId),
}
