use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::weights::learned::LearnedWeights;

/// Default record name for the learned weights.
pub const DEFAULT_RECORD_KEY: &str = "learned_weights";

/// Named-record storage for the weight store.
pub trait KeyValueStore {
    /// Read a record, `Ok(None)` when it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a record, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per record inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.record_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.record_path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(&tmp, value).map_err(io_err)?;
        // Atomic rename
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }
}

/// In-process store. Clones share the same records, so a test can keep a handle
/// while the weight store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail, as if the backing storage were full.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn insert(&self, key: &str, value: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(key.to_string(), value.to_string());
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        Ok(records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Owns the learned weights and keeps them in sync with a [`KeyValueStore`].
///
/// Loading never fails: a missing, unreadable or corrupt record yields the
/// defaults. Saving never fails either: errors are logged and the in-memory
/// weights stay authoritative.
pub struct WeightStore {
    backend: Box<dyn KeyValueStore + Send>,
    key: String,
    weights: LearnedWeights,
}

impl WeightStore {
    /// Load the named record from `backend`, overlaying it onto the defaults.
    pub fn load(backend: Box<dyn KeyValueStore + Send>, key: impl Into<String>) -> Self {
        let key = key.into();
        let weights = match backend.get(&key) {
            Ok(Some(text)) => match LearnedWeights::merge_saved(&text) {
                Some(weights) => {
                    tracing::info!(
                        key = %key,
                        games = weights.games_played,
                        generation = weights.generation,
                        "loaded learned weights"
                    );
                    weights
                }
                None => {
                    tracing::warn!(key = %key, "saved weights are corrupt, using defaults");
                    LearnedWeights::default()
                }
            },
            Ok(None) => {
                tracing::info!(key = %key, "no saved weights, using defaults");
                LearnedWeights::default()
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to read saved weights, using defaults");
                LearnedWeights::default()
            }
        };
        WeightStore {
            backend,
            key,
            weights,
        }
    }

    /// Fresh defaults backed by a private in-memory store.
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStore::new()), DEFAULT_RECORD_KEY)
    }

    pub fn weights(&self) -> &LearnedWeights {
        &self.weights
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mutate the weights and persist immediately.
    pub fn update<F: FnOnce(&mut LearnedWeights)>(&mut self, mutate: F) {
        mutate(&mut self.weights);
        self.persist();
    }

    /// Discard everything learned so far and persist the defaults.
    pub fn reset(&mut self) {
        self.update(|weights| *weights = LearnedWeights::default());
    }

    /// Write the current weights. Returns whether the write succeeded; failures
    /// are logged and otherwise ignored.
    pub fn persist(&mut self) -> bool {
        let result = serde_json::to_string(&self.weights)
            .map_err(StoreError::from)
            .and_then(|json| self.backend.set(&self.key, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to persist learned weights");
                false
            }
        }
    }
}
