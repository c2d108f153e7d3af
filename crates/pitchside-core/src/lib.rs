//! Pitchside Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the encounter
//! and intake contexts depend on, including the contracts of the services
//! the intake workflow consumes. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod collaborators;
pub mod command;
pub mod drafts;
pub mod error;
pub mod event;
pub mod fields;
pub mod module;
pub mod repository;
