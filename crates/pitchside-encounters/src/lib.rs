//! Pitchside — Encounter bounded context.
//!
//! An encounter is one data-collection session for one player in one
//! examination module. This crate owns its lifecycle: creation, the module
//! payload attached by the module form, and voiding.

pub mod application;
pub mod domain;
