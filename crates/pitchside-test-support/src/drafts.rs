//! Test draft repositories.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pitchside_core::drafts::{DraftKey, DraftRepository};
use pitchside_core::error::DomainError;

/// A draft repository backed by a `HashMap`, keyed by storage key.
#[derive(Debug, Default)]
pub struct MemoryDraftRepository {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryDraftRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value, bypassing the draft store (e.g. to plant a
    /// corrupt entry).
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert_raw(&self, key: &DraftKey, value: serde_json::Value) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.storage_key(), value);
    }

    /// Returns the raw stored value.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn raw(&self, key: &DraftKey) -> Option<serde_json::Value> {
        self.entries.lock().unwrap().get(&key.storage_key()).cloned()
    }

    /// Number of stored drafts.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether no drafts are stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DraftRepository for MemoryDraftRepository {
    async fn read(&self, key: &DraftKey) -> Result<Option<serde_json::Value>, DomainError> {
        Ok(self.raw(key))
    }

    async fn write(&self, key: &DraftKey, value: serde_json::Value) -> Result<(), DomainError> {
        self.insert_raw(key, value);
        Ok(())
    }

    async fn remove(&self, key: &DraftKey) -> Result<(), DomainError> {
        self.entries.lock().unwrap().remove(&key.storage_key());
        Ok(())
    }
}

/// A draft repository whose every operation fails, as a full or
/// unavailable local cache would.
#[derive(Debug)]
pub struct FailingDraftRepository;

#[async_trait]
impl DraftRepository for FailingDraftRepository {
    async fn read(&self, _key: &DraftKey) -> Result<Option<serde_json::Value>, DomainError> {
        Err(DomainError::Infrastructure("draft cache unavailable".into()))
    }

    async fn write(&self, _key: &DraftKey, _value: serde_json::Value) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("draft cache unavailable".into()))
    }

    async fn remove(&self, _key: &DraftKey) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("draft cache unavailable".into()))
    }
}
