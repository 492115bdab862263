//! Domain-level case record types.
//!
//! A `CaseRecord` is immutable once it has been translated from the wire model. Optional
//! fields are `None` when the source omitted them, left them blank, or supplied a value of the
//! wrong type.

use serde::{Deserialize, Serialize};

/// Recorded treatment result for a historical case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentOutcome {
    Cured,
    Improved,
    NoChange,
    Worsened,
    #[default]
    Unknown,
}

impl TreatmentOutcome {
    /// Parse a raw outcome value from source data.
    ///
    /// Accepts the English codes and the Korean labels used by intake forms. Anything else,
    /// including blank input, is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "cured" | "완치" => Self::Cured,
            "improved" | "호전" => Self::Improved,
            "no_change" | "nochange" | "no change" | "불변" => Self::NoChange,
            "worsened" | "악화" => Self::Worsened,
            _ => Self::Unknown,
        }
    }
}

/// A historical clinical case, as searched by the engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: String,

    /// Primary presenting complaint. Empty when the source had none.
    pub chief_complaint: String,

    /// Symptom names in source order, trimmed, blanks removed.
    pub symptoms: Vec<String>,

    pub diagnosis: Option<String>,

    pub patient_age: Option<u32>,

    pub patient_gender: Option<String>,

    /// Traditional-medicine constitution type, treated as an opaque category.
    pub patient_constitution: Option<String>,

    pub formula_name: Option<String>,

    pub formula_hanja: Option<String>,

    pub treatment_outcome: TreatmentOutcome,

    pub data_source: String,
}

impl CaseRecord {
    /// Build a record with only an id and chief complaint set.
    ///
    /// Mostly useful for assembling fixtures with struct update syntax.
    pub fn new(id: impl Into<String>, chief_complaint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chief_complaint: chief_complaint.into(),
            symptoms: Vec::new(),
            diagnosis: None,
            patient_age: None,
            patient_gender: None,
            patient_constitution: None,
            formula_name: None,
            formula_hanja: None,
            treatment_outcome: TreatmentOutcome::Unknown,
            data_source: crate::corpus::UNKNOWN_DATA_SOURCE.to_string(),
        }
    }

    pub fn constitution(&self) -> Option<&str> {
        self.patient_constitution.as_deref()
    }

    pub fn formula(&self) -> Option<&str> {
        self.formula_name.as_deref()
    }
}
