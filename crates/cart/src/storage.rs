//! Persistence Store: a string key-value blob store.
//!
//! The cart lives under a single key as a JSON array, the same way the
//! browser storefront kept it in local storage. [`FileStore`] keeps every key
//! in one JSON object on disk; [`MemoryStore`] is an in-process map.

use std::collections::{BTreeMap, HashMap};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rocketshoes_core::Cart;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors from reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Simple get/set string store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, `None` if it was never set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// Key-value store backed by a single JSON file.
///
/// Every `set` rewrites the whole file through a fresh temp file that is
/// renamed over it, so a crash or a concurrent writer never leaves partial
/// JSON behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let body = serde_json::to_string_pretty(entries)?;

        // Unique temp file in the same directory so the rename stays atomic
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(body.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process key-value store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// Cart snapshots
// =============================================================================

/// Restore the cart snapshot stored under `key`.
///
/// A missing, unreadable, or unparsable snapshot yields an empty cart.
pub fn load_cart<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Cart {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key, "No stored cart, starting empty");
            return Cart::new();
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => {
            tracing::debug!(key, items = cart.len(), "Restored cart");
            cart
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Stored cart is not valid JSON, starting empty");
            Cart::new()
        }
    }
}

/// Serialize `cart` and write it under `key`, replacing the prior snapshot.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn save_cart<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    cart: &Cart,
) -> Result<(), StorageError> {
    let body = serde_json::to_string(cart)?;
    store.set(key, &body)
}
