//! Commands for the Encounter context.

use chrono::NaiveDate;
use pitchside_core::command::Command;
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Command to create a new encounter.
#[derive(Debug, Clone)]
pub struct CreateEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player being examined.
    pub player_id: Uuid,
    /// Calendar date of the session.
    pub date: NaiveDate,
    /// The examination module.
    pub module: Module,
    /// Staff member creating the encounter.
    pub created_by: Uuid,
}

impl Command for CreateEncounter {
    fn command_type(&self) -> &'static str {
        "encounters.create_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Whether a module payload is being filled for the first time or amended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordMode {
    /// First save; fails if a payload already exists.
    Create,
    /// Subsequent save; fails if no payload exists yet.
    Update,
}

/// Command to record the module payload of an encounter.
#[derive(Debug, Clone)]
pub struct RecordModuleData {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter to attach the payload to.
    pub encounter_id: Uuid,
    /// The module the caller believes the encounter belongs to.
    pub module: Module,
    /// The form fields.
    pub fields: FieldMap,
    /// Create or update.
    pub mode: RecordMode,
}

impl Command for RecordModuleData {
    fn command_type(&self) -> &'static str {
        match self.mode {
            RecordMode::Create => "encounters.create_module_data",
            RecordMode::Update => "encounters.update_module_data",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to void an encounter.
#[derive(Debug, Clone)]
pub struct VoidEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter to void.
    pub encounter_id: Uuid,
    /// Why the encounter is voided.
    pub reason: String,
}

impl Command for VoidEncounter {
    fn command_type(&self) -> &'static str {
        "encounters.void_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
