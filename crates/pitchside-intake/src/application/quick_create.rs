//! Ad-hoc single encounter creation from an open module form.
//!
//! The operator is on a module form with a player chosen but no encounter.
//! Creation flushes the form's draft, creates today's encounter, and hands
//! back the entry state for the new encounter. Only the draft cache for the
//! new key is reinitialised; nothing else on the page is reset.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use pitchside_core::clock::Clock;
use pitchside_core::collaborators::{EncounterCreator, NewEncounter};
use pitchside_core::drafts::{ActiveForm, DraftKey};
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::draft_store::DraftStore;
use crate::domain::sequence::NavigationState;
use crate::error::IntakeError;

/// What happens to a draft typed before the encounter existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingDraftPolicy {
    /// Move it under the new encounter's key.
    #[default]
    Migrate,
    /// Drop it.
    Abandon,
}

/// Input of a quick creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickCreateRequest {
    /// The player the form is open for.
    pub player_id: Uuid,
    /// The form's module.
    pub module: Module,
    /// Staff member creating the encounter.
    pub created_by: Uuid,
}

/// Where the form continues after a quick creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormEntry {
    /// Route of the module form.
    pub route: String,
    /// Entry state for the new encounter.
    pub state: NavigationState,
    /// Draft fields now stored under the new encounter's key.
    pub restored: FieldMap,
}

/// Creates single encounters, at most one at a time per module and player.
#[derive(Debug, Default)]
pub struct QuickEncounterCreator {
    policy: PendingDraftPolicy,
    creating: Mutex<HashSet<(Module, Uuid)>>,
}

/// Releases a creating slot when dropped, whatever the outcome.
struct CreatingSlot<'a> {
    creating: &'a Mutex<HashSet<(Module, Uuid)>>,
    slot: (Module, Uuid),
}

impl Drop for CreatingSlot<'_> {
    fn drop(&mut self) {
        self.creating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.slot);
    }
}

impl QuickEncounterCreator {
    /// A creator applying `policy` to pending drafts.
    #[must_use]
    pub fn new(policy: PendingDraftPolicy) -> Self {
        Self {
            policy,
            creating: Mutex::new(HashSet::new()),
        }
    }

    /// The configured pending-draft policy.
    #[must_use]
    pub fn policy(&self) -> PendingDraftPolicy {
        self.policy
    }

    /// Whether a creation for `module` and `player_id` is in flight.
    pub fn is_creating(&self, module: Module, player_id: Uuid) -> bool {
        self.creating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(module, player_id))
    }

    fn claim(&self, module: Module, player_id: Uuid) -> Result<CreatingSlot<'_>, IntakeError> {
        let slot = (module, player_id);
        let inserted = self
            .creating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot);
        if inserted {
            Ok(CreatingSlot {
                creating: &self.creating,
                slot,
            })
        } else {
            Err(IntakeError::AlreadyCreating { module, player_id })
        }
    }

    /// Creates today's encounter for the request's module and player.
    ///
    /// # Errors
    ///
    /// `MissingPlayer` for a nil player, `AlreadyCreating` while the same
    /// creation is in flight, or `EncounterCreationFailed` if the
    /// collaborator rejects the call. A failed creation can be retried
    /// immediately.
    pub async fn create(
        &self,
        request: QuickCreateRequest,
        active_form: Option<&dyn ActiveForm>,
        creator: &dyn EncounterCreator,
        drafts: &DraftStore,
        clock: &dyn Clock,
    ) -> Result<FormEntry, IntakeError> {
        let QuickCreateRequest {
            player_id,
            module,
            created_by,
        } = request;
        if player_id.is_nil() {
            return Err(IntakeError::MissingPlayer);
        }
        let _slot = self.claim(module, player_id)?;

        if let Some(form) = active_form {
            drafts.flush(form).await;
        }

        let new_encounter = NewEncounter {
            player_id,
            date: clock.today(),
            module,
            created_by,
        };
        let encounter_id = creator.create(&new_encounter).await.map_err(|source| {
            warn!(%module, %player_id, %source, "quick encounter creation failed");
            IntakeError::EncounterCreationFailed {
                module,
                orphaned: Vec::new(),
                compensated: Vec::new(),
                source,
            }
        })?;

        let pending = DraftKey::pending(module, player_id);
        let target = DraftKey::for_encounter(module, encounter_id);
        let restored = match self.policy {
            PendingDraftPolicy::Migrate => drafts.migrate(&pending, &target).await,
            PendingDraftPolicy::Abandon => {
                drafts.clear(&pending).await;
                FieldMap::new()
            }
        };

        info!(%encounter_id, %module, %player_id, restored_fields = restored.len(), "quick encounter created");
        Ok(FormEntry {
            route: module.route().to_owned(),
            state: NavigationState::single(encounter_id, player_id),
            restored,
        })
    }
}
