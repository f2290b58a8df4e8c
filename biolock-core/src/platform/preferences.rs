//! Plain preference store trait and the file-backed default implementation.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::blob_store::atomic_replace;

/// Plain key-value storage for flags, overrides, and emulator-mode secrets.
///
/// Modelled on a process-standard preference store: reads of unset keys
/// degrade (`false`, `None`) rather than fail, and writes do not report
/// errors. A value written under one type reads back only as that type.
pub trait PreferenceStore: Send + Sync {
    /// Returns the string stored under `key`, if any.
    fn string(&self, key: &str) -> Option<String>;

    /// Stores a string under `key`.
    fn set_string(&self, key: &str, value: &str);

    /// Returns the boolean stored under `key`; unset reads as `false`.
    fn bool(&self, key: &str) -> bool;

    /// Stores a boolean under `key`.
    fn set_bool(&self, key: &str, value: bool);

    /// Returns the raw bytes stored under `key`, if any.
    fn bytes(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores raw bytes under `key`.
    fn set_bytes(&self, key: &str, value: &[u8]);

    /// Removes any value stored under `key`.
    fn remove(&self, key: &str);
}

/// A typed preference value as persisted in the JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum PrefValue {
    Bool(bool),
    Text(String),
    /// Base64-encoded bytes.
    Blob(String),
}

/// File-backed preference store.
///
/// The whole document is one JSON map, persisted by atomic replacement on
/// every mutation. A persist failure keeps the in-memory state and is logged
/// rather than surfaced, matching the fire-and-forget contract of
/// [`PreferenceStore`] writes.
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<HashMap<String, PrefValue>>,
}

impl FilePreferences {
    /// Opens the preference document at `path`, creating an empty store when
    /// the file does not exist. A corrupt document is discarded and replaced
    /// on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let values = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                log::warn!("preference document unreadable, starting empty: {err}");
                HashMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn update(&self, apply: impl FnOnce(&mut HashMap<String, PrefValue>)) {
        let mut values = self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        apply(&mut values);
        match serde_json::to_vec_pretty(&*values) {
            Ok(bytes) => {
                if let Some(parent) = self.path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if let Err(err) = atomic_replace(&self.path, &bytes) {
                    log::warn!("preference document not persisted: {err}");
                }
            }
            Err(err) => log::warn!("preference document not encodable: {err}"),
        }
    }

    fn value(&self, key: &str) -> Option<PrefValue> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl PreferenceStore for FilePreferences {
    fn string(&self, key: &str) -> Option<String> {
        match self.value(key) {
            Some(PrefValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn set_string(&self, key: &str, value: &str) {
        self.update(|values| {
            values.insert(key.to_owned(), PrefValue::Text(value.to_owned()));
        });
    }

    fn bool(&self, key: &str) -> bool {
        matches!(self.value(key), Some(PrefValue::Bool(true)))
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.update(|values| {
            values.insert(key.to_owned(), PrefValue::Bool(value));
        });
    }

    fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.value(key) {
            Some(PrefValue::Blob(encoded)) => BASE64.decode(encoded).ok(),
            _ => None,
        }
    }

    fn set_bytes(&self, key: &str, value: &[u8]) {
        self.update(|values| {
            values.insert(key.to_owned(), PrefValue::Blob(BASE64.encode(value)));
        });
    }

    fn remove(&self, key: &str) {
        self.update(|values| {
            values.remove(key);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");

        let prefs = FilePreferences::open(&path).expect("open");
        prefs.set_string("name", "alice");
        prefs.set_bool("opted_in", true);
        prefs.set_bytes("snapshot", &[1, 2, 3]);
        drop(prefs);

        let prefs = FilePreferences::open(&path).expect("reopen");
        assert_eq!(prefs.string("name").as_deref(), Some("alice"));
        assert!(prefs.bool("opted_in"));
        assert_eq!(prefs.bytes("snapshot"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_unset_keys_degrade() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = FilePreferences::open(dir.path().join("p.json")).expect("open");
        assert_eq!(prefs.string("missing"), None);
        assert!(!prefs.bool("missing"));
        assert_eq!(prefs.bytes("missing"), None);
    }

    #[test]
    fn test_type_mismatch_reads_as_unset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = FilePreferences::open(dir.path().join("p.json")).expect("open");
        prefs.set_string("key", "text");
        assert!(!prefs.bool("key"));
        assert_eq!(prefs.bytes("key"), None);
    }

    #[test]
    fn test_remove_deletes_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = FilePreferences::open(dir.path().join("p.json")).expect("open");
        prefs.set_bool("key", true);
        prefs.remove("key");
        assert!(!prefs.bool("key"));
    }

    #[test]
    fn test_corrupt_document_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("p.json");
        std::fs::write(&path, b"not json").expect("write");
        let prefs = FilePreferences::open(&path).expect("open");
        assert_eq!(prefs.string("anything"), None);
    }
}
