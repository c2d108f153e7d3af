//! Best-effort draft cache over a [`DraftRepository`].
//!
//! Nothing here fails: read errors and corrupt entries load as an empty
//! field map, and write or remove errors are logged and dropped.

use std::sync::Arc;

use pitchside_core::drafts::{ActiveForm, DraftKey, DraftRepository};
use pitchside_core::fields::FieldMap;
use tracing::{debug, warn};

/// Tracing target for flushes that precede an encounter creation.
pub const FLUSH_BEFORE_CREATE: &str = "flush-before-create";

/// Write-through cache of unsaved module form fields.
#[derive(Clone)]
pub struct DraftStore {
    repository: Arc<dyn DraftRepository>,
}

impl DraftStore {
    /// Wraps a storage backend.
    pub fn new(repository: Arc<dyn DraftRepository>) -> Self {
        Self { repository }
    }

    /// The last saved fields under `key`, or an empty map.
    pub async fn load(&self, key: &DraftKey) -> FieldMap {
        self.find(key).await.unwrap_or_default()
    }

    /// The last saved fields under `key`, `None` if no readable draft is
    /// stored. A draft saved as an empty map is `Some`.
    pub async fn find(&self, key: &DraftKey) -> Option<FieldMap> {
        let value = match self.repository.read(key).await {
            Ok(value) => value?,
            Err(error) => {
                warn!(draft_key = %key, %error, "draft read failed; starting empty");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(fields) => Some(fields),
            Err(error) => {
                warn!(draft_key = %key, %error, "corrupt draft ignored");
                None
            }
        }
    }

    /// Overwrites the draft under `key`.
    pub async fn save(&self, key: &DraftKey, fields: &FieldMap) {
        let value = match serde_json::to_value(fields) {
            Ok(value) => value,
            Err(error) => {
                warn!(draft_key = %key, %error, "draft not serializable; skipped");
                return;
            }
        };
        if let Err(error) = self.repository.write(key, value).await {
            warn!(draft_key = %key, %error, "draft write failed");
        }
    }

    /// Removes the draft under `key`. Clearing a missing draft is a no-op.
    pub async fn clear(&self, key: &DraftKey) {
        if let Err(error) = self.repository.remove(key).await {
            warn!(draft_key = %key, %error, "draft clear failed");
        }
    }

    /// Saves the active form's in-memory fields before returning them.
    ///
    /// The save has completed (or failed and been logged) by the time this
    /// returns, so a following create call never races it.
    pub async fn flush(&self, form: &dyn ActiveForm) -> FieldMap {
        let key = form.draft_key();
        let fields = form.flush();
        debug!(target: FLUSH_BEFORE_CREATE, draft_key = %key, field_count = fields.len(), "flushing active form");
        self.save(&key, &fields).await;
        fields
    }

    /// Moves the draft under `from` to `to`, returning the moved fields.
    ///
    /// An empty source leaves `to` untouched. The source is cleared either
    /// way.
    pub async fn migrate(&self, from: &DraftKey, to: &DraftKey) -> FieldMap {
        let fields = self.load(from).await;
        if !fields.is_empty() {
            self.save(to, &fields).await;
            debug!(from = %from, to = %to, "draft migrated");
        }
        self.clear(from).await;
        fields
    }
}
