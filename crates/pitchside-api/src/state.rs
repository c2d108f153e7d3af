//! Shared application state.

use std::sync::Arc;

use chrono::TimeDelta;
use pitchside_core::clock::Clock;
use pitchside_core::collaborators::{EncounterCreator, ModuleDataService, PlayerDirectory};
use pitchside_core::drafts::DraftRepository;
use pitchside_core::repository::EventRepository;
use pitchside_intake::application::confirm::FailurePolicy;
use pitchside_intake::application::draft_store::DraftStore;
use pitchside_intake::application::quick_create::{PendingDraftPolicy, QuickEncounterCreator};

use crate::adapters::EventSourcedEncounters;
use crate::sessions::WizardSessions;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used for timestamps and "today".
    pub clock: Arc<dyn Clock>,
    /// Encounter event store.
    pub event_repository: Arc<dyn EventRepository>,
    /// Creates and voids encounters for the intake workflow.
    pub encounter_creator: Arc<dyn EncounterCreator>,
    /// Module payload storage.
    pub module_data: Arc<dyn ModuleDataService>,
    /// Player listing.
    pub players: Arc<dyn PlayerDirectory>,
    /// Draft cache.
    pub drafts: DraftStore,
    /// Running selection wizards.
    pub wizards: WizardSessions,
    /// Ad-hoc encounter creation.
    pub quick_creator: Arc<QuickEncounterCreator>,
    /// Multi-create failure handling.
    pub failure_policy: FailurePolicy,
}

impl AppState {
    /// Create new application state. Encounter creation and module data go
    /// through the event-sourced encounter context over `event_repository`.
    /// Wizards untouched for `wizard_ttl` are dropped.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_repository: Arc<dyn EventRepository>,
        draft_repository: Arc<dyn DraftRepository>,
        players: Arc<dyn PlayerDirectory>,
        failure_policy: FailurePolicy,
        pending_drafts: PendingDraftPolicy,
        wizard_ttl: TimeDelta,
    ) -> Self {
        let encounters = Arc::new(EventSourcedEncounters::new(
            clock.clone(),
            event_repository.clone(),
        ));
        let wizards = WizardSessions::new(clock.clone(), wizard_ttl);
        Self {
            clock,
            event_repository,
            encounter_creator: encounters.clone(),
            module_data: encounters,
            players,
            drafts: DraftStore::new(draft_repository),
            wizards,
            quick_creator: Arc::new(QuickEncounterCreator::new(pending_drafts)),
            failure_policy,
        }
    }
}
