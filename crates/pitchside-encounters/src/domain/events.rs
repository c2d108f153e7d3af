//! Domain events for the Encounter context.

use chrono::NaiveDate;
use pitchside_core::event::{DomainEvent, EventMetadata};
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted when an encounter is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterCreated {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The player being examined.
    pub player_id: Uuid,
    /// Calendar date of the session.
    pub date: NaiveDate,
    /// The examination module.
    pub module: Module,
    /// Staff member who created the encounter.
    pub created_by: Uuid,
}

/// Emitted when the module form's payload is saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDataRecorded {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// Full field snapshot; replaces any previous payload.
    pub fields: FieldMap,
}

/// Emitted when an encounter is withdrawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterVoided {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// Why the encounter was voided.
    pub reason: String,
}

/// Event type identifier for [`EncounterCreated`].
pub const ENCOUNTER_CREATED_EVENT_TYPE: &str = "encounters.encounter_created";

/// Event type identifier for [`ModuleDataRecorded`].
pub const MODULE_DATA_RECORDED_EVENT_TYPE: &str = "encounters.module_data_recorded";

/// Event type identifier for [`EncounterVoided`].
pub const ENCOUNTER_VOIDED_EVENT_TYPE: &str = "encounters.encounter_voided";

/// Event payload variants for the Encounter context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EncounterEventKind {
    /// An encounter has been created.
    EncounterCreated(EncounterCreated),
    /// Module data has been recorded.
    ModuleDataRecorded(ModuleDataRecorded),
    /// An encounter has been voided.
    EncounterVoided(EncounterVoided),
}

/// Domain event envelope for the Encounter context.
#[derive(Debug, Clone)]
pub struct EncounterEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: EncounterEventKind,
}

impl DomainEvent for EncounterEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            EncounterEventKind::EncounterCreated(_) => ENCOUNTER_CREATED_EVENT_TYPE,
            EncounterEventKind::ModuleDataRecorded(_) => MODULE_DATA_RECORDED_EVENT_TYPE,
            EncounterEventKind::EncounterVoided(_) => ENCOUNTER_VOIDED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("EncounterEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
