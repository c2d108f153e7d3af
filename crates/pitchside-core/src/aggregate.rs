//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that are rebuilt by replaying their event stream.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the number of persisted events applied so far.
    fn version(&self) -> i64;

    /// Apply a persisted event to internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Events produced by command handling that are not yet persisted.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drops uncommitted events once they are stored.
    fn clear_uncommitted_events(&mut self);
}
