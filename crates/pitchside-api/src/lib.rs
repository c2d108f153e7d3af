//! Pitchside API — HTTP surface for the encounter intake workflow.
//!
//! Exposes the encounter context, the selection wizard, module sequencing,
//! quick encounter creation and the draft cache over axum.

pub mod adapters;
pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod telemetry;
