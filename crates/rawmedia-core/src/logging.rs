//! tracing setup.
//!
//! Events go to `$XDG_STATE_HOME/rawmedia/rawmedia.log` so stdout carries only
//! the media report; stderr is used when the state dir is not writable.

use anyhow::{anyhow, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "rawmedia.log";

const DEFAULT_FILTER: &str = "info,rawmedia=debug,rawmedia_core=debug";

/// Where tracing output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// `~/.local/state/rawmedia/rawmedia.log` (or the `XDG_STATE_HOME` equivalent).
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rawmedia")?;
    Ok(xdg_dirs.get_state_home().join(LOG_FILE_NAME))
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `RUST_LOG` when set and valid, the crate default otherwise.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber for `target`. Fails if the log file cannot
/// be opened or a subscriber is already installed.
pub fn init(target: &LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false);

    match target {
        LogTarget::File(path) => {
            let file = open_append(path)?;
            builder
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!("tracing init: {}", e))?;
            tracing::info!("rawmedia logging to {}", path.display());
        }
        LogTarget::Stderr => builder
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| anyhow!("tracing init: {}", e))?,
    }
    Ok(())
}

/// Log to the XDG state file. Returns Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<()> {
    init(&LogTarget::File(default_log_path()?))
}

/// Log to stderr; a subscriber that is already installed is left in place.
pub fn init_logging_stderr() {
    let _ = init(&LogTarget::Stderr);
}
