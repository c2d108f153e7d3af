//! Test doubles for the services the intake workflow consumes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pitchside_core::collaborators::{
    EncounterCreator, ModuleDataService, NewEncounter, Player, PlayerDirectory,
};
use pitchside_core::error::DomainError;
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use uuid::Uuid;

/// An encounter creator that records every request in call order and hands
/// out fresh ids. Can be told to reject the n-th create call (0-based) and
/// to reject every void.
#[derive(Debug, Default)]
pub struct RecordingEncounterCreator {
    fail_on_call: Option<usize>,
    fail_voids: bool,
    requests: Mutex<Vec<NewEncounter>>,
    created: Mutex<Vec<Uuid>>,
    voided: Mutex<Vec<Uuid>>,
}

impl RecordingEncounterCreator {
    /// A creator whose every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A creator that rejects the create call with index `call` (0-based).
    #[must_use]
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    /// Makes every `void` call fail as well.
    #[must_use]
    pub fn with_failing_voids(mut self) -> Self {
        self.fail_voids = true;
        self
    }

    /// Every create request received, including the rejected one.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<NewEncounter> {
        self.requests.lock().unwrap().clone()
    }

    /// Ids handed out by successful creates, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn created_ids(&self) -> Vec<Uuid> {
        self.created.lock().unwrap().clone()
    }

    /// Ids successfully voided, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn voided_ids(&self) -> Vec<Uuid> {
        self.voided.lock().unwrap().clone()
    }
}

#[async_trait]
impl EncounterCreator for RecordingEncounterCreator {
    async fn create(&self, request: &NewEncounter) -> Result<Uuid, DomainError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(DomainError::Infrastructure("upstream returned 503".into()));
        }
        let id = Uuid::new_v4();
        self.created.lock().unwrap().push(id);
        Ok(id)
    }

    async fn void(&self, encounter_id: Uuid, _reason: &str) -> Result<(), DomainError> {
        if self.fail_voids {
            return Err(DomainError::Infrastructure("upstream returned 503".into()));
        }
        self.voided.lock().unwrap().push(encounter_id);
        Ok(())
    }
}

/// Module payload storage in a `HashMap`, following the create/update
/// contract of the real service.
#[derive(Debug, Default)]
pub struct MemoryModuleDataService {
    payloads: Mutex<HashMap<(Module, Uuid), FieldMap>>,
    fail_reads: bool,
}

impl MemoryModuleDataService {
    /// An empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A service whose reads fail with an infrastructure error.
    #[must_use]
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Seeds a saved payload.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_payload(self, module: Module, encounter_id: Uuid, fields: FieldMap) -> Self {
        self.payloads
            .lock()
            .unwrap()
            .insert((module, encounter_id), fields);
        self
    }

    /// The saved payload, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn payload(&self, module: Module, encounter_id: Uuid) -> Option<FieldMap> {
        self.payloads
            .lock()
            .unwrap()
            .get(&(module, encounter_id))
            .cloned()
    }
}

#[async_trait]
impl ModuleDataService for MemoryModuleDataService {
    async fn get_by_encounter_id(
        &self,
        module: Module,
        encounter_id: Uuid,
    ) -> Result<Option<FieldMap>, DomainError> {
        if self.fail_reads {
            return Err(DomainError::Infrastructure("upstream returned 500".into()));
        }
        Ok(self.payload(module, encounter_id))
    }

    async fn create(
        &self,
        module: Module,
        encounter_id: Uuid,
        fields: &FieldMap,
    ) -> Result<(), DomainError> {
        let mut payloads = self.payloads.lock().unwrap();
        if payloads.contains_key(&(module, encounter_id)) {
            return Err(DomainError::AlreadyExists(format!(
                "{module} data for encounter {encounter_id}"
            )));
        }
        payloads.insert((module, encounter_id), fields.clone());
        Ok(())
    }

    async fn update(
        &self,
        module: Module,
        encounter_id: Uuid,
        fields: &FieldMap,
    ) -> Result<(), DomainError> {
        let mut payloads = self.payloads.lock().unwrap();
        match payloads.get_mut(&(module, encounter_id)) {
            Some(existing) => {
                existing.clone_from(fields);
                Ok(())
            }
            None => Err(DomainError::NotFound(format!(
                "{module} data for encounter {encounter_id}"
            ))),
        }
    }
}

/// A player directory returning a fixed list.
#[derive(Debug, Default)]
pub struct StaticPlayerDirectory(pub Vec<Player>);

#[async_trait]
impl PlayerDirectory for StaticPlayerDirectory {
    async fn get_all(&self) -> Result<Vec<Player>, DomainError> {
        Ok(self.0.clone())
    }
}
