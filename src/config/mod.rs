//! Runtime settings and the credential store.

pub mod keystore;

pub use keystore::KeyStore;

use std::path::PathBuf;
use std::time::Duration;

use crate::consts::{DEFAULT_BASE_URL, DEFAULT_LOG_DIR, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "IELTS_MODEL";
pub const TIMEOUT_VAR: &str = "IELTS_TIMEOUT_SECS";
pub const LOG_DIR_VAR: &str = "IELTS_LOG_DIR";

/// Everything the scorer and the CLI need besides the credential.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// OpenAI-compatible base URL, without the trailing `/chat/completions`.
    pub api_base_url: String,
    pub model: String,
    /// Upper bound on a single scoring request, enforced by the front end.
    pub timeout: Duration,
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Settings {
    /// Read overrides from the store (which falls back to the environment).
    /// Unparsable numbers keep their default.
    pub fn from_store(keys: &KeyStore) -> Self {
        let default = Self::default();
        Self {
            api_base_url: keys.get(BASE_URL_VAR).unwrap_or(default.api_base_url),
            model: keys.get(MODEL_VAR).unwrap_or(default.model),
            timeout: keys
                .get(TIMEOUT_VAR)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
            log_dir: keys
                .get(LOG_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(default.log_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(content: &str) -> (KeyStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, content).unwrap();
        (KeyStore::open(path).unwrap(), dir)
    }

    #[test]
    fn defaults_when_store_is_empty() {
        let (keys, _dir) = store_with("");
        let settings = Settings::from_store(&keys);
        assert_eq!(settings.model, Settings::default().model);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn store_values_override_defaults() {
        let (keys, _dir) = store_with("IELTS_MODEL=gpt-4o\nIELTS_TIMEOUT_SECS=45\nIELTS_LOG_DIR=/tmp/ielts\n");
        let settings = Settings::from_store(&keys);
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.timeout, Duration::from_secs(45));
        assert_eq!(settings.log_dir, PathBuf::from("/tmp/ielts"));
    }

    #[test]
    fn unparsable_timeout_keeps_default() {
        let (keys, _dir) = store_with("IELTS_TIMEOUT_SECS=soon\n");
        let settings = Settings::from_store(&keys);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
