use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::feedback_log::FeedbackLog;
use crate::state_store::StateStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The backend refused the write (disabled, full, read-only).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String-keyed blob storage, the persistence surface the pilot relies on.
///
/// `set` replaces the whole value for a key in one step; readers never
/// observe a partially written value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend rejects the write.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the delete.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    reject_writes: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail with `StorageError::Unavailable`, the way a
    /// full or disabled browser store would.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// The two persisted records behind one shared backend.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub state: StateStore,
    pub feedback: FeedbackLog,
}

impl Storage {
    #[must_use]
    pub fn from_store(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: StateStore::new(Arc::clone(&kv)),
            feedback: FeedbackLog::new(Arc::clone(&kv)),
            kv,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryKeyValueStore::new()))
    }
}
