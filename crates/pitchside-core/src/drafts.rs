//! Draft cache contracts.
//!
//! A draft is a local, best-effort snapshot of a module form's unsaved
//! fields. Its existence never implies that the encounter it is keyed by
//! exists on the server.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::fields::FieldMap;
use crate::module::Module;

/// What a draft is attached to besides its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftScope {
    /// A form editing an existing encounter.
    Encounter {
        /// The encounter being edited.
        encounter_id: Uuid,
    },
    /// A form opened for a player before any encounter exists.
    Pending {
        /// The player the form was opened for.
        player_id: Uuid,
    },
}

/// Cache key of a draft: one module plus its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftKey {
    /// The module whose form produced the draft.
    pub module: Module,
    /// The encounter (or pending player) the draft belongs to.
    pub scope: DraftScope,
}

impl DraftKey {
    /// Key for a form editing `encounter_id`.
    #[must_use]
    pub fn for_encounter(module: Module, encounter_id: Uuid) -> Self {
        Self {
            module,
            scope: DraftScope::Encounter { encounter_id },
        }
    }

    /// Key for a form opened for `player_id` without an encounter.
    #[must_use]
    pub fn pending(module: Module, player_id: Uuid) -> Self {
        Self {
            module,
            scope: DraftScope::Pending { player_id },
        }
    }

    /// Flat string used by storage backends.
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.to_string()
    }

    /// Whether the draft is attached to an encounter that may not exist yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.scope, DraftScope::Pending { .. })
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            DraftScope::Encounter { encounter_id } => write!(f, "{}:{encounter_id}", self.module),
            DraftScope::Pending { player_id } => {
                write!(f, "{}:pending:{player_id}", self.module)
            }
        }
    }
}

/// Raw storage behind the draft cache.
///
/// Implementations report failures; the draft store decides to swallow them.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Reads the stored value, `None` if nothing is stored under `key`.
    async fn read(&self, key: &DraftKey) -> Result<Option<serde_json::Value>, DomainError>;

    /// Overwrites the value stored under `key`.
    async fn write(&self, key: &DraftKey, value: serde_json::Value) -> Result<(), DomainError>;

    /// Removes the value stored under `key`. Removing nothing succeeds.
    async fn remove(&self, key: &DraftKey) -> Result<(), DomainError>;
}

/// The currently mounted module form.
///
/// Callers that are about to create an encounter ask the form for its
/// in-memory fields directly instead of broadcasting a flush request.
pub trait ActiveForm: Send + Sync {
    /// The key the form's draft is stored under.
    fn draft_key(&self) -> DraftKey;

    /// Returns the form's current, possibly unsaved, fields.
    fn flush(&self) -> FieldMap;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_for_encounter_scope() {
        let encounter_id = Uuid::parse_str("6f1c1a3e-8f6b-4f39-9c43-3b1f0d7a9e21").unwrap();

        let key = DraftKey::for_encounter(Module::MedicalExam, encounter_id);

        assert_eq!(
            key.storage_key(),
            "medical_exam:6f1c1a3e-8f6b-4f39-9c43-3b1f0d7a9e21"
        );
        assert!(!key.is_pending());
    }

    #[test]
    fn test_storage_key_for_pending_scope() {
        let player_id = Uuid::parse_str("0d6b8f55-31a4-4c1e-a7a2-5c9e2f4b7d10").unwrap();

        let key = DraftKey::pending(Module::Nutrition, player_id);

        assert_eq!(
            key.storage_key(),
            "nutrition:pending:0d6b8f55-31a4-4c1e-a7a2-5c9e2f4b7d10"
        );
        assert!(key.is_pending());
    }

    #[test]
    fn test_keys_differ_by_module() {
        let encounter_id = Uuid::new_v4();

        let a = DraftKey::for_encounter(Module::BodyComposition, encounter_id);
        let b = DraftKey::for_encounter(Module::GpsPerformance, encounter_id);

        assert_ne!(a.storage_key(), b.storage_key());
    }
}
