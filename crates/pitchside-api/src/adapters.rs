//! Intake collaborator ports backed by the event-sourced Encounter context.

use std::sync::Arc;

use async_trait::async_trait;
use pitchside_core::clock::Clock;
use pitchside_core::collaborators::{EncounterCreator, ModuleDataService, NewEncounter};
use pitchside_core::error::DomainError;
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use pitchside_core::repository::EventRepository;
use pitchside_encounters::application::{command_handlers, query_handlers};
use pitchside_encounters::domain::commands::{
    CreateEncounter, RecordMode, RecordModuleData, VoidEncounter,
};
use uuid::Uuid;

/// Creates, voids and fills encounters through the encounter command
/// handlers.
#[derive(Clone)]
pub struct EventSourcedEncounters {
    clock: Arc<dyn Clock>,
    event_repository: Arc<dyn EventRepository>,
}

impl EventSourcedEncounters {
    /// Wraps the encounter event stream.
    pub fn new(clock: Arc<dyn Clock>, event_repository: Arc<dyn EventRepository>) -> Self {
        Self {
            clock,
            event_repository,
        }
    }

    async fn record(
        &self,
        module: Module,
        encounter_id: Uuid,
        fields: &FieldMap,
        mode: RecordMode,
    ) -> Result<(), DomainError> {
        let command = RecordModuleData {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            module,
            fields: fields.clone(),
            mode,
        };
        command_handlers::handle_record_module_data(
            &command,
            self.clock.as_ref(),
            self.event_repository.as_ref(),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl EncounterCreator for EventSourcedEncounters {
    async fn create(&self, request: &NewEncounter) -> Result<Uuid, DomainError> {
        let command = CreateEncounter {
            correlation_id: Uuid::new_v4(),
            player_id: request.player_id,
            date: request.date,
            module: request.module,
            created_by: request.created_by,
        };
        let result = command_handlers::handle_create_encounter(
            &command,
            self.clock.as_ref(),
            self.event_repository.as_ref(),
        )
        .await?;
        Ok(result.aggregate_id)
    }

    async fn void(&self, encounter_id: Uuid, reason: &str) -> Result<(), DomainError> {
        let command = VoidEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            reason: reason.to_owned(),
        };
        command_handlers::handle_void_encounter(
            &command,
            self.clock.as_ref(),
            self.event_repository.as_ref(),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ModuleDataService for EventSourcedEncounters {
    async fn get_by_encounter_id(
        &self,
        module: Module,
        encounter_id: Uuid,
    ) -> Result<Option<FieldMap>, DomainError> {
        match query_handlers::get_module_data(encounter_id, module, self.event_repository.as_ref())
            .await
        {
            Err(err) if err.is_not_found() => Ok(None),
            other => other,
        }
    }

    async fn create(
        &self,
        module: Module,
        encounter_id: Uuid,
        fields: &FieldMap,
    ) -> Result<(), DomainError> {
        self.record(module, encounter_id, fields, RecordMode::Create)
            .await
    }

    async fn update(
        &self,
        module: Module,
        encounter_id: Uuid,
        fields: &FieldMap,
    ) -> Result<(), DomainError> {
        self.record(module, encounter_id, fields, RecordMode::Update)
            .await
    }
}
