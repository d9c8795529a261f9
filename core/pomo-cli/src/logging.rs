//! Tracing setup for the `pomo` binary.
//!
//! User-facing output goes to stdout with `println!`; tracing goes to stderr
//! (or a file) and defaults to `warn` so normal runs stay quiet.
//!
//! - `POMO_DEBUG_LOG=1` forces `debug`.
//! - `RUST_LOG` is honoured otherwise.
//! - `POMO_LOG_FILE=<path>` appends to a file through a non-blocking writer.

use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "POMO_DEBUG_LOG";
const LOG_FILE_ENV: &str = "POMO_LOG_FILE";
const DEFAULT_LEVEL: &str = "warn";

/// Keeps the non-blocking file writer alive; drop it last.
pub struct LoggingGuard {
    _guard: Option<WorkerGuard>,
}

pub fn init() -> LoggingGuard {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    };

    let (writer, guard, ansi) = match log_file_path() {
        Some(path) => match open_append(&path) {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                (BoxMakeWriter::new(non_blocking), Some(guard), false)
            }
            Err(err) => {
                eprintln!(
                    "Warning: failed to open log file {}: {}",
                    path.display(),
                    err
                );
                stderr_writer()
            }
        },
        None => stderr_writer(),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer);

    if subscriber.try_init().is_err() {
        return LoggingGuard { _guard: None };
    }

    LoggingGuard { _guard: guard }
}

fn stderr_writer() -> (BoxMakeWriter, Option<WorkerGuard>, bool) {
    (
        BoxMakeWriter::new(std::io::stderr),
        None,
        std::io::stderr().is_terminal(),
    )
}

fn log_file_path() -> Option<PathBuf> {
    env::var_os(LOG_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn open_append(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
