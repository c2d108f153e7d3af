//! Pure intake logic: sequencing and the selection wizard state machine.

pub mod sequence;
pub mod wizard;
