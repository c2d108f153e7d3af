//! Pitchside — multi-module encounter intake workflow.
//!
//! Lets an operator pick a player and one or more examination modules,
//! creates one encounter per module, chains the module forms into an ordered
//! sequence, and keeps unsaved form edits in a local draft cache.

pub mod application;
pub mod domain;
pub mod error;
