//! Key-value persistence and configuration.
//!
//! Every engine persists its own keys through an injected
//! [`KeyValueStore`]. Writes are synchronous and atomic per key only;
//! there is no transaction spanning several keys.

mod config;
pub mod database;
mod memory;

pub use config::{Config, GoalsConfig, LevelConfig, NotificationsConfig, StreakConfig, TimerConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, StoreError};

/// String-keyed persistence used by all engines.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value. Missing keys, read errors and decode
/// errors all yield `None`; the latter two are logged.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable value");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed");
            None
        }
    }
}

/// Encode and write a JSON value, logging (not returning) failures.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let encoded = match serde_json::to_string(value) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to encode value");
            return;
        }
    };
    if let Err(e) = store.set(key, &encoded) {
        tracing::warn!(key, error = %e, "store write failed");
    }
}

/// Delete a key, logging (not returning) failures.
pub fn delete_key(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.delete(key) {
        tracing::warn!(key, error = %e, "store delete failed");
    }
}

/// Returns the data directory.
///
/// `STUDYTRACK_DATA_DIR` wins when set. Otherwise `~/.config/studytrack/`,
/// or `~/.config/studytrack-dev/` when `STUDYTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STUDYTRACK_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYTRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studytrack-dev")
            } else {
                base_dir.join("studytrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_json_falls_back_on_garbage() {
        let store = MemoryStore::new();
        store.set("n", "not json").unwrap();
        assert_eq!(load_json::<u32>(&store, "n"), None);
        assert_eq!(load_json::<u32>(&store, "missing"), None);
    }

    #[test]
    fn save_then_load_json() {
        let store = MemoryStore::new();
        save_json(&store, "pair", &(3u32, "x".to_string()));
        assert_eq!(
            load_json::<(u32, String)>(&store, "pair"),
            Some((3, "x".to_string()))
        );
        delete_key(&store, "pair");
        assert!(store.get("pair").unwrap().is_none());
    }
}
