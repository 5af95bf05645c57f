//! Tracing setup: human-readable lines on stderr plus a plain-text log file.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_FILE: &str = "app.log";

/// Rotate once the file reaches this size.
pub const MAX_LOG_BYTES: u64 = 1_000_000;

/// Rotated files kept next to the live one (`app.log.1` .. `app.log.N`).
pub const LOG_BACKUPS: usize = 3;

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
/// Returns the path of the live log file.
pub fn init(log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let path = log_dir.join(LOG_FILE);
    rotate(&path, MAX_LOG_BYTES, LOG_BACKUPS)
        .with_context(|| format!("failed to rotate {}", path.display()))?;

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("logging already initialised")?;

    Ok(path)
}

/// Shift `path` to `path.1`, `path.1` to `path.2` and so on when `path` has
/// grown past `max_bytes`. The oldest backup is overwritten.
pub fn rotate(path: &Path, max_bytes: u64, backups: usize) -> io::Result<()> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if size < max_bytes {
        return Ok(());
    }
    if backups == 0 {
        return fs::remove_file(path);
    }

    for i in (1..backups).rev() {
        let from = backup_path(path, i);
        if from.exists() {
            fs::rename(&from, backup_path(path, i + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}
