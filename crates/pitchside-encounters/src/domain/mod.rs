//! Domain model for the Encounter context.

pub mod aggregates;
pub mod commands;
pub mod events;
