//! Intake operations that talk to collaborators and the draft cache.

pub mod confirm;
pub mod draft_store;
pub mod module_form;
pub mod quick_create;
