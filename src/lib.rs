pub mod commands;
pub mod context;
pub mod logging;
pub mod presenter;
pub mod repl;

pub use context::{CliContext, Startup};
pub use repl::readline;
