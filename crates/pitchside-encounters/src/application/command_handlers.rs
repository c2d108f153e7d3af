//! Command handlers for the Encounter context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load aggregate, execute command, persist events.

use pitchside_core::aggregate::AggregateRoot;
use pitchside_core::clock::Clock;
use pitchside_core::error::DomainError;
use pitchside_core::event::{DomainEvent, EventMetadata};
use pitchside_core::repository::{EventRepository, StoredEvent};
use tracing::debug;
use uuid::Uuid;

use crate::domain::aggregates::Encounter;
use crate::domain::commands::{CreateEncounter, RecordModuleData, VoidEncounter};
use crate::domain::events::{EncounterEvent, EncounterEventKind};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct EncounterCommandResult {
    /// The aggregate ID affected or created by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes an `Encounter` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    encounter_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Encounter, DomainError> {
    let mut encounter = Encounter::new(encounter_id);
    for stored in existing_events {
        let kind: EncounterEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = EncounterEvent {
            metadata: EventMetadata::from(stored),
            kind,
        };
        encounter.apply(&event);
    }
    Ok(encounter)
}

/// Loads and rebuilds an existing encounter.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the stream is empty.
pub(crate) async fn load(
    encounter_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Encounter, DomainError> {
    let existing_events = repo.load_events(encounter_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(encounter_id));
    }
    reconstitute(encounter_id, &existing_events)
}

async fn persist(
    encounter: &Encounter,
    repo: &dyn EventRepository,
) -> Result<EncounterCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = encounter
        .uncommitted_events()
        .iter()
        .map(|event| event.to_stored())
        .collect();

    repo.append_events(encounter.id, encounter.version(), &stored_events)
        .await?;

    Ok(EncounterCommandResult {
        aggregate_id: encounter.id,
        stored_events,
    })
}

/// Handles the `CreateEncounter` command: creates a new aggregate and
/// persists the `EncounterCreated` event.
///
/// This is a CREATION command: the handler assigns the `encounter_id`.
///
/// # Errors
///
/// Returns `DomainError` if validation or event appending fails.
pub async fn handle_create_encounter(
    command: &CreateEncounter,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<EncounterCommandResult, DomainError> {
    let encounter_id = Uuid::new_v4();
    let mut encounter = Encounter::new(encounter_id);

    encounter.create(
        command.player_id,
        command.date,
        command.module,
        command.created_by,
        command.correlation_id,
        clock,
    )?;

    let result = persist(&encounter, repo).await?;
    debug!(
        %encounter_id,
        player_id = %command.player_id,
        module = %command.module,
        "encounter created"
    );
    Ok(result)
}

/// Handles the `RecordModuleData` command: loads the encounter, records the
/// module payload, and persists the resulting event.
///
/// # Errors
///
/// Returns `DomainError` if the encounter does not exist, the record mode
/// does not match the stored state, or event loading/appending fails.
pub async fn handle_record_module_data(
    command: &RecordModuleData,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<EncounterCommandResult, DomainError> {
    let mut encounter = load(command.encounter_id, repo).await?;

    encounter.record_module_data(
        command.module,
        command.fields.clone(),
        command.mode,
        command.correlation_id,
        clock,
    )?;

    persist(&encounter, repo).await
}

/// Handles the `VoidEncounter` command: loads the encounter, voids it, and
/// persists the resulting event (none if it was already voided).
///
/// # Errors
///
/// Returns `DomainError` if the encounter does not exist or event
/// loading/appending fails.
pub async fn handle_void_encounter(
    command: &VoidEncounter,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<EncounterCommandResult, DomainError> {
    let mut encounter = load(command.encounter_id, repo).await?;

    encounter.void(&command.reason, command.correlation_id, clock);

    if encounter.uncommitted_events().is_empty() {
        return Ok(EncounterCommandResult {
            aggregate_id: command.encounter_id,
            stored_events: Vec::new(),
        });
    }
    persist(&encounter, repo).await
}
