//! Test active form.

use std::sync::Mutex;

use pitchside_core::drafts::{ActiveForm, DraftKey};
use pitchside_core::fields::{FieldMap, FieldValue};

/// An active form holding a fixed key and mutable in-memory fields.
#[derive(Debug)]
pub struct StaticForm {
    key: DraftKey,
    fields: Mutex<FieldMap>,
    flushes: Mutex<usize>,
}

impl StaticForm {
    /// Creates a form with no fields.
    #[must_use]
    pub fn new(key: DraftKey) -> Self {
        Self {
            key,
            fields: Mutex::new(FieldMap::new()),
            flushes: Mutex::new(0),
        }
    }

    /// Sets one in-memory field without saving it anywhere.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_field(self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields
            .lock()
            .unwrap()
            .insert(name.to_owned(), value.into());
        self
    }

    /// How many times `flush` was called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap()
    }
}

impl ActiveForm for StaticForm {
    fn draft_key(&self) -> DraftKey {
        self.key
    }

    fn flush(&self) -> FieldMap {
        *self.flushes.lock().unwrap() += 1;
        self.fields.lock().unwrap().clone()
    }
}
