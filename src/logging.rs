//! Log output setup
//!
//! The proxy logs to stderr. The dashboard owns the terminal, so it logs to
//! `skyglance.log` in the platform cache directory instead.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "skyglance=info";
const LOG_FILE: &str = "skyglance.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs to stderr, honouring `RUST_LOG`
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs to a file in the cache directory
///
/// Returns the log file path, or `None` when no directory is available (logs
/// are then dropped).
pub fn init_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "skyglance")?;
    let dir = dirs.cache_dir();
    fs::create_dir_all(dir).ok()?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .ok()?;

    Some(path)
}
