use std::fs::{File, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Append debug logs to this file in addition to stderr
pub const LOG_FILE_ENV: &str = "REGIS_LOG_FILE";

pub fn init_tracing() -> bool {
    init_tracing_with_default("info")
}

/// Install the global subscriber. `RUST_LOG` wins over `default_directive`.
/// Returns false when a subscriber was already installed.
pub fn init_tracing_with_default(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let log_path = std::env::var(LOG_FILE_ENV).ok();
    let file_layer = log_path.as_deref().and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(LevelFilter::DEBUG),
        ),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path, e);
            None
        }
    });
    let file_enabled = file_layer.is_some();

    let installed = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed && file_enabled {
        if let Some(path) = log_path {
            eprintln!("File logging enabled: {}", path);
        }
    }
    installed
}

fn open_log_file(path: &str) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
