//! Contracts of the services the intake workflow consumes.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::fields::FieldMap;
use crate::module::Module;

/// Request to create one encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEncounter {
    /// The player being examined.
    pub player_id: Uuid,
    /// Calendar date of the session.
    pub date: NaiveDate,
    /// The examination module.
    pub module: Module,
    /// Staff member creating the encounter.
    pub created_by: Uuid,
}

/// Creates (and, for compensation, voids) encounters.
#[async_trait]
pub trait EncounterCreator: Send + Sync {
    /// Creates an encounter and returns its server-assigned id.
    async fn create(&self, request: &NewEncounter) -> Result<Uuid, DomainError>;

    /// Voids a previously created encounter.
    async fn void(&self, encounter_id: Uuid, reason: &str) -> Result<(), DomainError>;
}

/// Per-module payload storage.
#[async_trait]
pub trait ModuleDataService: Send + Sync {
    /// Returns the saved payload, `None` if the form was never filled.
    ///
    /// Transports that answer "not found" for an unfilled form must map it
    /// to `Ok(None)`; every other failure is an error.
    async fn get_by_encounter_id(
        &self,
        module: Module,
        encounter_id: Uuid,
    ) -> Result<Option<FieldMap>, DomainError>;

    /// Saves the first payload of an encounter.
    async fn create(
        &self,
        module: Module,
        encounter_id: Uuid,
        fields: &FieldMap,
    ) -> Result<(), DomainError>;

    /// Replaces the payload of an encounter.
    async fn update(
        &self,
        module: Module,
        encounter_id: Uuid,
        fields: &FieldMap,
    ) -> Result<(), DomainError>;
}

/// A player as shown in pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque player identifier.
    pub player_id: Uuid,
    /// Name shown to staff.
    pub display_name: String,
    /// Squad or team, if known.
    pub squad: Option<String>,
}

/// Read-only player listing.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Returns every player, ordered by display name.
    async fn get_all(&self) -> Result<Vec<Player>, DomainError>;
}
