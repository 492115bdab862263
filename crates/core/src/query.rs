//! Search query types.
//!
//! Every field is optional on the wire and a mistyped or `null` field counts as absent: text
//! becomes an empty string, numbers become `None` and nested objects take their defaults.
//! Blank demographic fields are treated the same as missing ones.

use casematch_types::NonEmptyText;
use casematch_wire::lenient;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{DEFAULT_MIN_CONFIDENCE, DEFAULT_TOP_K};

/// A presenting patient to find similar historical cases for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    #[serde(deserialize_with = "lenient::text_or_empty")]
    pub chief_complaint: String,
    #[serde(deserialize_with = "symptom_list")]
    pub symptoms: Vec<SymptomInput>,
    #[serde(deserialize_with = "lenient::text")]
    pub diagnosis: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub patient_info: PatientInfo,
    #[serde(deserialize_with = "lenient::or_default")]
    pub options: SearchOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymptomInput {
    #[serde(deserialize_with = "lenient::text_or_empty")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub severity: Option<String>,
}

impl From<&str> for SymptomInput {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            severity: None,
        }
    }
}

/// Accepted shapes for `symptoms`: a list of objects or bare names, or one comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum SymptomList {
    Entries(Vec<SymptomEntry>),
    Joined(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SymptomEntry {
    Bare(String),
    Named(SymptomInput),
    Other(IgnoredAny),
}

fn symptom_list<'de, D>(deserializer: D) -> Result<Vec<SymptomInput>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match SymptomList::deserialize(deserializer)? {
        SymptomList::Entries(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                SymptomEntry::Bare(name) => Some(SymptomInput::from(name.as_str())),
                SymptomEntry::Named(input) => Some(input),
                SymptomEntry::Other(_) => None,
            })
            .collect(),
        SymptomList::Joined(joined) => joined.split(',').map(SymptomInput::from).collect(),
        SymptomList::Other(_) => Vec::new(),
    })
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientInfo {
    #[serde(deserialize_with = "lenient::age")]
    pub age: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub constitution: Option<String>,
}

impl PatientInfo {
    pub fn gender(&self) -> Option<NonEmptyText> {
        NonEmptyText::from_optional(self.gender.as_deref())
    }

    pub fn constitution(&self) -> Option<NonEmptyText> {
        NonEmptyText::from_optional(self.constitution.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    #[serde(deserialize_with = "lenient::or_default")]
    pub top_k: Option<usize>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub min_confidence: Option<f64>,
}

impl SearchOptions {
    pub fn top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_MIN_CONFIDENCE)
    }
}

impl Query {
    pub fn new(chief_complaint: impl Into<String>) -> Self {
        Self {
            chief_complaint: chief_complaint.into(),
            ..Self::default()
        }
    }

    /// A query made of a single symptom and nothing else.
    pub fn symptom_only(symptom: &str) -> Self {
        Self {
            symptoms: vec![SymptomInput::from(symptom)],
            ..Self::default()
        }
    }

    pub fn with_symptoms<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.symptoms = names.into_iter().map(SymptomInput::from).collect();
        self
    }

    pub fn with_patient_info(mut self, patient_info: PatientInfo) -> Self {
        self.patient_info = patient_info;
        self
    }

    pub fn with_options(mut self, top_k: Option<usize>, min_confidence: Option<f64>) -> Self {
        self.options = SearchOptions {
            top_k,
            min_confidence,
        };
        self
    }

    /// Non-blank symptom names, trimmed, in query order.
    pub fn symptom_names(&self) -> impl Iterator<Item = &str> {
        self.symptoms
            .iter()
            .map(|s| s.name.trim())
            .filter(|name| !name.is_empty())
    }

    /// Human-readable rendering of the searched text, used in search metadata.
    pub fn query_text(&self) -> String {
        std::iter::once(self.chief_complaint.trim())
            .chain(self.symptom_names())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
