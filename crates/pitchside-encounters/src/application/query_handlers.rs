//! Query handlers for the Encounter context.
//!
//! This module contains query handlers that reconstitute aggregates
//! from stored events and return read-only view DTOs.

use chrono::NaiveDate;
use pitchside_core::error::DomainError;
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use pitchside_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;

/// Read-only view of an encounter aggregate.
#[derive(Debug, Serialize)]
pub struct EncounterView {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The player being examined.
    pub player_id: Option<Uuid>,
    /// Calendar date of the session.
    pub date: Option<NaiveDate>,
    /// The examination module.
    pub module: Option<Module>,
    /// Staff member who created the encounter.
    pub created_by: Option<Uuid>,
    /// Whether the module form has been saved at least once.
    pub has_module_data: bool,
    /// Whether the encounter has been voided.
    pub voided: bool,
    /// Current version (event count).
    pub version: i64,
}

/// Retrieves an encounter by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_encounter_by_id(
    encounter_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<EncounterView, DomainError> {
    let encounter = command_handlers::load(encounter_id, repo).await?;
    Ok(EncounterView {
        encounter_id,
        player_id: encounter.player_id,
        date: encounter.date,
        module: encounter.module,
        created_by: encounter.created_by,
        has_module_data: encounter.module_data.is_some(),
        voided: encounter.voided,
        version: encounter.version,
    })
}

/// Retrieves the module payload recorded for an encounter.
///
/// `Ok(None)` means the encounter exists but its form has not been filled
/// yet.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the encounter does not exist
/// and `DomainError::Validation` if it belongs to a different module.
pub async fn get_module_data(
    encounter_id: Uuid,
    module: Module,
    repo: &dyn EventRepository,
) -> Result<Option<FieldMap>, DomainError> {
    let encounter = command_handlers::load(encounter_id, repo).await?;
    if encounter.module != Some(module) {
        return Err(DomainError::Validation(format!(
            "encounter {encounter_id} does not belong to module {module}"
        )));
    }
    Ok(encounter.module_data)
}
