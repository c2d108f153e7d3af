//! Form field values.
//!
//! Module forms are opaque to the intake workflow: their state is carried
//! around as a flat map from field name to a scalar leaf.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A boolean toggle.
    Bool(bool),
    /// A numeric measurement.
    Number(f64),
    /// Free text or an enumerated choice.
    Text(String),
}

/// Snapshot of a module form's fields, keyed by field name.
pub type FieldMap = BTreeMap<String, FieldValue>;

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}
