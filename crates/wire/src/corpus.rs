//! Corpus wire model and translation helpers.
//!
//! Responsibilities:
//! - Define the wire model for a source case record (snake_case keys)
//! - Parse a JSON array of records, reporting the failing path on structural errors
//! - Translate wire records into domain [`CaseRecord`]s with documented defaults
//!
//! Notes:
//! - Unknown keys are ignored; sources routinely carry extra bookkeeping columns
//! - A record without an `id` receives a positional id (`case-{index}`)

use crate::lenient;
use crate::record::{CaseRecord, TreatmentOutcome};
use crate::{WireError, WireResult};
use serde::Deserialize;

/// `data_source` value used when the source record does not name one.
pub const UNKNOWN_DATA_SOURCE: &str = "unknown";

// ============================================================================
// Public Corpus operations
// ============================================================================

/// Corpus parsing operations.
///
/// This is a zero-sized type used for namespacing corpus-related operations.
pub struct Corpus;

impl Corpus {
    /// Parse a corpus from JSON text.
    ///
    /// The document must be a JSON array whose elements are objects. Individual fields are
    /// parsed leniently (see module docs), so only structural problems are reported.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Translation`] if:
    /// - the text is not valid JSON,
    /// - the top level is not an array,
    /// - any element is not an object.
    ///
    /// The message includes the path to the failing element (e.g. `[3]`).
    pub fn parse(json_text: &str) -> WireResult<Vec<CaseRecord>> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let wire = match serde_path_to_error::deserialize::<_, Vec<CaseRecordWire>>(
            &mut deserializer,
        ) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(WireError::Translation(format!(
                    "Corpus schema mismatch at {path}: {source}"
                )));
            }
        };

        deserializer
            .end()
            .map_err(|e| WireError::Translation(format!("Trailing data after corpus: {e}")))?;

        Ok(wire
            .into_iter()
            .enumerate()
            .map(|(index, record)| wire_to_domain(index, record))
            .collect())
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of one source case record.
#[derive(Clone, Debug, Default, Deserialize)]
struct CaseRecordWire {
    #[serde(default, deserialize_with = "lenient::identifier")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    chief_complaint: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    symptoms: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    diagnosis: Option<String>,
    #[serde(default, deserialize_with = "lenient::age")]
    patient_age: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text")]
    patient_gender: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    patient_constitution: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    formula_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    formula_hanja: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    treatment_outcome: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    data_source: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(index: usize, wire: CaseRecordWire) -> CaseRecord {
    CaseRecord {
        id: wire.id.unwrap_or_else(|| format!("case-{index}")),
        chief_complaint: wire.chief_complaint.unwrap_or_default(),
        symptoms: wire.symptoms,
        diagnosis: wire.diagnosis,
        patient_age: wire.patient_age,
        patient_gender: wire.patient_gender,
        patient_constitution: wire.patient_constitution,
        formula_name: wire.formula_name,
        formula_hanja: wire.formula_hanja,
        treatment_outcome: wire
            .treatment_outcome
            .as_deref()
            .map(TreatmentOutcome::parse)
            .unwrap_or_default(),
        data_source: wire
            .data_source
            .unwrap_or_else(|| UNKNOWN_DATA_SOURCE.to_string()),
    }
}
