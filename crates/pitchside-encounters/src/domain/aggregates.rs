//! Aggregate roots for the Encounter context.

use chrono::NaiveDate;
use pitchside_core::aggregate::AggregateRoot;
use pitchside_core::clock::Clock;
use pitchside_core::error::DomainError;
use pitchside_core::event::EventMetadata;
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use uuid::Uuid;

use super::commands::RecordMode;
use super::events::{
    ENCOUNTER_CREATED_EVENT_TYPE, ENCOUNTER_VOIDED_EVENT_TYPE, EncounterCreated, EncounterEvent,
    EncounterEventKind, EncounterVoided, MODULE_DATA_RECORDED_EVENT_TYPE, ModuleDataRecorded,
};

/// The aggregate root for an encounter.
#[derive(Debug)]
pub struct Encounter {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// The player being examined.
    pub(crate) player_id: Option<Uuid>,
    /// Calendar date of the session.
    pub(crate) date: Option<NaiveDate>,
    /// The examination module.
    pub(crate) module: Option<Module>,
    /// Staff member who created the encounter.
    pub(crate) created_by: Option<Uuid>,
    /// Latest module payload, if the form was ever saved.
    pub(crate) module_data: Option<FieldMap>,
    /// Whether the encounter has been voided.
    pub(crate) voided: bool,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<EncounterEvent>,
}

impl Encounter {
    /// Creates an empty encounter aggregate.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            player_id: None,
            date: None,
            module: None,
            created_by: None,
            module_data: None,
            voided: false,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn metadata(&self, event_type: &str, correlation_id: Uuid, clock: &dyn Clock) -> EventMetadata {
        EventMetadata {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id: self.id,
            sequence_number: self.next_sequence_number(),
            correlation_id,
            causation_id: correlation_id,
            occurred_at: clock.now(),
        }
    }

    /// Whether an `EncounterCreated` event has been applied or queued.
    fn is_created(&self) -> bool {
        self.module.is_some()
            || self
                .uncommitted_events
                .iter()
                .any(|e| matches!(e.kind, EncounterEventKind::EncounterCreated(_)))
    }

    /// Returns the module, once created.
    #[must_use]
    pub fn module(&self) -> Option<Module> {
        self.module
    }

    /// Creates the encounter, producing an `EncounterCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the player or creator id is nil,
    /// and `DomainError::AlreadyExists` if the encounter was already created.
    pub fn create(
        &mut self,
        player_id: Uuid,
        date: NaiveDate,
        module: Module,
        created_by: Uuid,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if player_id.is_nil() {
            return Err(DomainError::Validation("player_id must not be empty".into()));
        }
        if created_by.is_nil() {
            return Err(DomainError::Validation("created_by must not be empty".into()));
        }
        if self.is_created() {
            return Err(DomainError::AlreadyExists(format!("encounter {}", self.id)));
        }

        let event = EncounterEvent {
            metadata: self.metadata(ENCOUNTER_CREATED_EVENT_TYPE, correlation_id, clock),
            kind: EncounterEventKind::EncounterCreated(EncounterCreated {
                encounter_id: self.id,
                player_id,
                date,
                module,
                created_by,
            }),
        };
        self.uncommitted_events.push(event);
        Ok(())
    }

    /// Records the module payload, producing a `ModuleDataRecorded` event.
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation` if the encounter is voided or belongs to
    ///   another module.
    /// - `DomainError::AlreadyExists` for `RecordMode::Create` when a payload
    ///   is already stored.
    /// - `DomainError::NotFound` for `RecordMode::Update` when nothing is
    ///   stored yet.
    pub fn record_module_data(
        &mut self,
        module: Module,
        fields: FieldMap,
        mode: RecordMode,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.voided {
            return Err(DomainError::Validation(format!(
                "encounter {} is voided",
                self.id
            )));
        }
        if self.module != Some(module) {
            return Err(DomainError::Validation(format!(
                "encounter {} does not belong to module {module}",
                self.id
            )));
        }
        match (mode, self.module_data.is_some()) {
            (RecordMode::Create, true) => {
                return Err(DomainError::AlreadyExists(format!(
                    "{module} data for encounter {}",
                    self.id
                )));
            }
            (RecordMode::Update, false) => {
                return Err(DomainError::NotFound(format!(
                    "{module} data for encounter {}",
                    self.id
                )));
            }
            _ => {}
        }

        let event = EncounterEvent {
            metadata: self.metadata(MODULE_DATA_RECORDED_EVENT_TYPE, correlation_id, clock),
            kind: EncounterEventKind::ModuleDataRecorded(ModuleDataRecorded {
                encounter_id: self.id,
                fields,
            }),
        };
        self.uncommitted_events.push(event);
        Ok(())
    }

    /// Voids the encounter, producing an `EncounterVoided` event.
    ///
    /// Voiding an already voided encounter is a no-op.
    pub fn void(&mut self, reason: &str, correlation_id: Uuid, clock: &dyn Clock) {
        if self.voided {
            return;
        }

        let event = EncounterEvent {
            metadata: self.metadata(ENCOUNTER_VOIDED_EVENT_TYPE, correlation_id, clock),
            kind: EncounterEventKind::EncounterVoided(EncounterVoided {
                encounter_id: self.id,
                reason: reason.to_owned(),
            }),
        };
        self.uncommitted_events.push(event);
    }
}

impl AggregateRoot for Encounter {
    type Event = EncounterEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            EncounterEventKind::EncounterCreated(payload) => {
                self.player_id = Some(payload.player_id);
                self.date = Some(payload.date);
                self.module = Some(payload.module);
                self.created_by = Some(payload.created_by);
            }
            EncounterEventKind::ModuleDataRecorded(payload) => {
                self.module_data = Some(payload.fields.clone());
            }
            EncounterEventKind::EncounterVoided(_) => {
                self.voided = true;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
