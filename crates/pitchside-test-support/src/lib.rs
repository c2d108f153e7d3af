//! Shared test doubles and utilities for the Pitchside intake service.

mod clock;
mod collaborators;
mod drafts;
mod forms;
mod repository;

pub use clock::{FixedClock, ManualClock};
pub use collaborators::{MemoryModuleDataService, RecordingEncounterCreator, StaticPlayerDirectory};
pub use drafts::{FailingDraftRepository, MemoryDraftRepository};
pub use forms::StaticForm;
pub use repository::{
    EmptyEventRepository, FailingEventRepository, InMemoryEventRepository,
    RecordingEventRepository,
};
