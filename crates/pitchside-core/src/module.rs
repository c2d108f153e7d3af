//! The fixed set of examination modules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A category of examination or data-capture form.
///
/// Every encounter belongs to exactly one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Body composition measurements (mass, skinfolds, bioimpedance).
    BodyComposition,
    /// GPS-derived training and match load.
    GpsPerformance,
    /// Physician medical examination.
    MedicalExam,
    /// Physiotherapy assessment.
    Physiotherapy,
    /// Nutrition consultation.
    Nutrition,
}

impl Module {
    /// All modules, in display order.
    pub const ALL: [Module; 5] = [
        Module::BodyComposition,
        Module::GpsPerformance,
        Module::MedicalExam,
        Module::Physiotherapy,
        Module::Nutrition,
    ];

    /// Stable machine identifier, identical to the serialized form.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Module::BodyComposition => "body_composition",
            Module::GpsPerformance => "gps_performance",
            Module::MedicalExam => "medical_exam",
            Module::Physiotherapy => "physiotherapy",
            Module::Nutrition => "nutrition",
        }
    }

    /// Route of the module's data-capture form.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Module::BodyComposition => "/modules/body-composition",
            Module::GpsPerformance => "/modules/gps-performance",
            Module::MedicalExam => "/modules/medical-exam",
            Module::Physiotherapy => "/modules/physiotherapy",
            Module::Nutrition => "/modules/nutrition",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Module {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|module| module.slug() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown module: {s}")))
    }
}
