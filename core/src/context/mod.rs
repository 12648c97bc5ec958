mod background_tasks;
mod config;
mod error;

pub use background_tasks::BackgroundTasks;
pub use config::{MeterSettings, SettingsExt, SettingsStore};
pub use error::ConfigError;
