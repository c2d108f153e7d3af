//! Intake error types.

use chrono::NaiveDate;
use pitchside_core::error::DomainError;
use pitchside_core::module::Module;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::wizard::WizardStage;

/// Errors raised by the intake workflow.
///
/// The first four variants are input-boundary guard failures: they are
/// raised before any collaborator is called.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// No player has been chosen.
    #[error("a player must be selected")]
    MissingPlayer,

    /// The module set is empty.
    #[error("at least one module must be selected")]
    NoModulesSelected,

    /// A scheduled date lies before today.
    #[error("scheduled date {date} is before today ({today})")]
    ScheduledDateInPast {
        /// The rejected date.
        date: NaiveDate,
        /// The current date.
        today: NaiveDate,
    },

    /// The wizard is not in a stage that allows the operation.
    #[error("cannot {operation} during {stage}")]
    InvalidStage {
        /// The wizard's current stage.
        stage: WizardStage,
        /// The attempted operation.
        operation: &'static str,
    },

    /// An encounter could not be created.
    ///
    /// `orphaned` lists encounters created earlier in the same run that are
    /// still live; `compensated` lists the ones voided after the failure.
    #[error("could not create the {module} encounter")]
    EncounterCreationFailed {
        /// The module whose encounter failed.
        module: Module,
        /// Encounters left in place.
        orphaned: Vec<Uuid>,
        /// Encounters voided by compensation.
        compensated: Vec<Uuid>,
        /// The collaborator's error.
        #[source]
        source: DomainError,
    },

    /// A quick creation for the same module and player is still running.
    #[error("an encounter is already being created for {module} / player {player_id}")]
    AlreadyCreating {
        /// The module being created.
        module: Module,
        /// The player being created for.
        player_id: Uuid,
    },

    /// A collaborator failed outside encounter creation.
    #[error(transparent)]
    Collaborator(#[from] DomainError),
}
