pub mod backend;
pub mod cache;
pub mod context;
pub mod dataset;
pub mod detail;
pub mod engine;
pub mod format;
pub mod mailbox;
pub mod observable;
pub mod ranking;
pub mod session;
pub mod snapshot;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use backend::{Backend, BackendError, HttpBackend, spawn_poller};
pub use cache::{ActivityTracker, EntityCache, EntityRecord};
pub use context::{BackgroundTasks, ConfigError, MeterSettings, SettingsExt, SettingsStore};
pub use dataset::{Dataset, DetailBlock, EntityId, UserData};
pub use detail::DetailSummary;
pub use engine::{EngineCommand, EngineError, MeterEngine, MeterView};
pub use mailbox::IngestionMailbox;
pub use observable::Observable;
pub use session::{CombatClock, Countdown};
pub use snapshot::{SnapshotError, SnapshotRecord};
