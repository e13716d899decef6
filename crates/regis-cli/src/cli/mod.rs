pub mod commands;
pub mod config;
pub mod notifier;

pub use commands::{run, CliCommand};
pub use config::{load_config, CliOverrides};
pub use notifier::TerminalNotifier;
