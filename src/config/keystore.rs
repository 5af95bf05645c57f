//! Line-oriented credential store backed by a dotenv-style file.
//!
//! The store is an explicit object: hand an `Arc<KeyStore>` to whoever needs
//! the credential. [`KeyStore::set`] persists the value and makes it visible
//! to every holder right away, so nothing touches the process environment.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Persistent `KEY=value` store.
pub struct KeyStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl KeyStore {
    /// Load the store at `path`. A missing file is fine; it is created on the
    /// first [`set`](Self::set). Values already present in the process
    /// environment win over the file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut values = HashMap::new();

        match dotenvy::from_path_iter(&path) {
            Ok(entries) => {
                for entry in entries {
                    let (key, value) = entry
                        .with_context(|| format!("failed to parse {}", path.display()))?;
                    if env_value(&key).is_none() {
                        values.insert(key, value);
                    }
                }
            }
            Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        }

        debug!(path = %path.display(), loaded = values.len(), "key store opened");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value for `name`. A stored entry always wins, and an empty
    /// one reads as absent; only unknown names fall back to the environment.
    pub fn get(&self, name: &str) -> Option<String> {
        let stored = self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();
        match stored {
            Some(value) => Some(value).filter(|v| !v.is_empty()),
            None => env_value(name),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Persist `name=value` (value trimmed) and make it current.
    ///
    /// The file is rewritten in full: the first line assigning `name` is
    /// replaced in place, later duplicates are dropped, everything else is
    /// kept verbatim and in order.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let value = value.trim();
        self.ensure_file()?;

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let updated = upsert_line(&content, name, value);
        fs::write(&self.path, updated)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());

        info!(key = name, path = %self.path.display(), "credential saved");
        Ok(())
    }

    fn ensure_file(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut options = fs::OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options
            .open(&self.path)
            .with_context(|| format!("failed to create {}", self.path.display()))?;
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Replace or append the assignment for `name`, preserving unrelated lines.
fn upsert_line(content: &str, name: &str, value: &str) -> String {
    let prefix = format!("{name}=");
    let assignment = format!("{name}={value}");
    let mut lines: Vec<&str> = Vec::new();
    let mut found = false;

    for line in content.split_terminator('\n') {
        if line.trim().starts_with(&prefix) {
            if !found {
                lines.push(&assignment);
                found = true;
            }
            continue;
        }
        lines.push(line);
    }
    if !found {
        lines.push(&assignment);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
