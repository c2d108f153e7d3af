//! Confirmation of a selection wizard.
//!
//! Creates one encounter per selected module, strictly one after another in
//! selection order, then decides where the operator goes next.

use pitchside_core::clock::Clock;
use pitchside_core::collaborators::{EncounterCreator, NewEncounter};
use pitchside_core::drafts::ActiveForm;
use pitchside_core::module::Module;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::draft_store::DraftStore;
use crate::domain::wizard::{Routing, SelectionWizard, plan_routing};
use crate::error::IntakeError;

/// What happens to already-created encounters when a later create fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave them; they are reported as orphaned.
    #[default]
    LeaveInPlace,
    /// Void them in reverse creation order.
    Compensate,
}

/// One encounter created during confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatedEncounter {
    /// The module of the encounter.
    pub module: Module,
    /// The new encounter.
    pub encounter_id: Uuid,
}

/// Result of a successful confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationOutcome {
    /// Created encounters in selection order.
    pub encounters: Vec<CreatedEncounter>,
    /// Navigation decision.
    #[serde(flatten)]
    pub routing: Routing,
}

/// Confirms `wizard`: flushes the active form's draft if one is mounted,
/// creates the encounters, and plans the routing.
///
/// # Errors
///
/// Returns a guard error if the wizard is not confirmable, or
/// `EncounterCreationFailed` on the first rejected create. No further
/// creates are attempted after a rejection.
pub async fn confirm_selection(
    wizard: &SelectionWizard,
    creator: &dyn EncounterCreator,
    drafts: &DraftStore,
    active_form: Option<&dyn ActiveForm>,
    clock: &dyn Clock,
    policy: FailurePolicy,
) -> Result<ConfirmationOutcome, IntakeError> {
    let today = clock.today();
    let selection = wizard.selection(today)?;

    if let Some(form) = active_form {
        drafts.flush(form).await;
    }

    let mut created: Vec<(Module, Uuid)> = Vec::with_capacity(selection.modules.len());
    for module in &selection.modules {
        let request = NewEncounter {
            player_id: selection.player_id,
            date: selection.date,
            module: *module,
            created_by: selection.created_by,
        };
        match creator.create(&request).await {
            Ok(encounter_id) => {
                debug!(%encounter_id, %module, "encounter created");
                created.push((*module, encounter_id));
            }
            Err(source) => {
                warn!(%module, player_id = %selection.player_id, %source, "encounter creation failed");
                let (orphaned, compensated) = settle_partial(creator, &created, *module, policy).await;
                return Err(IntakeError::EncounterCreationFailed {
                    module: *module,
                    orphaned,
                    compensated,
                    source,
                });
            }
        }
    }

    let routing = plan_routing(&selection, &created, today);
    info!(
        wizard_id = %wizard.id(),
        player_id = %selection.player_id,
        encounter_count = created.len(),
        deferred = routing.deferred,
        "intake confirmed"
    );

    Ok(ConfirmationOutcome {
        encounters: created
            .into_iter()
            .map(|(module, encounter_id)| CreatedEncounter {
                module,
                encounter_id,
            })
            .collect(),
        routing,
    })
}

/// Applies `policy` to the encounters created before `failed` was rejected.
/// Returns `(orphaned, compensated)`.
async fn settle_partial(
    creator: &dyn EncounterCreator,
    created: &[(Module, Uuid)],
    failed: Module,
    policy: FailurePolicy,
) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut orphaned = Vec::new();
    let mut compensated = Vec::new();

    match policy {
        FailurePolicy::LeaveInPlace => {
            orphaned.extend(created.iter().map(|(_, id)| *id));
        }
        FailurePolicy::Compensate => {
            let reason = format!("intake rolled back after {failed} creation failed");
            for (module, encounter_id) in created.iter().rev() {
                match creator.void(*encounter_id, &reason).await {
                    Ok(()) => {
                        debug!(%encounter_id, %module, "encounter voided");
                        compensated.push(*encounter_id);
                    }
                    Err(source) => {
                        warn!(%encounter_id, %module, %source, "void failed");
                        orphaned.push(*encounter_id);
                    }
                }
            }
            orphaned.reverse();
        }
    }

    if !orphaned.is_empty() {
        error!(?orphaned, failed_module = %failed, "orphaned encounters left after failed intake");
    }
    (orphaned, compensated)
}
