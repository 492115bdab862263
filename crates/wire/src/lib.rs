//! Corpus wire/boundary support for the case similarity engine.
//!
//! This crate provides the **domain record** the engine searches over and the
//! **wire model** used by the external data-loading subsystem:
//! - `CaseRecord` and `TreatmentOutcome` as strongly typed, immutable domain values
//! - lenient JSON parsing of snake_case source records (`chief_complaint`, `patient_age`, ...)
//! - translation from wire structs into domain records
//!
//! Source data is heterogeneous and partially missing. Field-level problems (wrong type,
//! blank strings, unparseable ages) degrade to "absent" instead of failing the whole corpus;
//! only a structurally wrong document (not an array of objects) is an error.

pub mod corpus;
pub mod lenient;
pub mod record;

pub use corpus::Corpus;
pub use record::{CaseRecord, TreatmentOutcome};

/// Errors returned by the `casematch-wire` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`WireError`].
pub type WireResult<T> = Result<T, WireError>;
