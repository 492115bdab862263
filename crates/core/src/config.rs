//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Request handling never reads process-wide environment variables.

use crate::{EngineError, EngineResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the outcome aggregator finds the canonical record for a matched candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutcomeResolution {
    /// Look up by record id only. An id that is not in the corpus counts as an unknown outcome.
    #[default]
    Id,
    /// Look up by id, then fall back to the first record with an identical chief complaint.
    ///
    /// Two distinct cases can share a chief complaint, so this can attribute one case's
    /// outcome to another. Retained for parity with older statistics.
    IdThenChiefComplaint,
}

impl FromStr for OutcomeResolution {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "id_then_chief_complaint" | "legacy" => Ok(Self::IdThenChiefComplaint),
            other => Err(EngineError::InvalidInput(format!(
                "unknown outcome resolution '{other}' (expected 'id' or 'id_then_chief_complaint')"
            ))),
        }
    }
}

/// Where demographic breakdowns come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DemographicsBasis {
    /// Fixed illustrative ratios applied to the corpus size.
    #[default]
    Illustrative,
    /// Per-record counts for fields the corpus carries (age, gender, constitution).
    Observed,
}

impl FromStr for DemographicsBasis {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "illustrative" => Ok(Self::Illustrative),
            "observed" => Ok(Self::Observed),
            other => Err(EngineError::InvalidInput(format!(
                "unknown demographics basis '{other}' (expected 'illustrative' or 'observed')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    corpus_path: Option<PathBuf>,
    outcome_resolution: OutcomeResolution,
    demographics_basis: DemographicsBasis,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `corpus_path` is not checked here. A missing or unreadable corpus degrades to an empty
    /// corpus when it is loaded, it never stops the process.
    pub fn new(
        corpus_path: Option<PathBuf>,
        outcome_resolution: OutcomeResolution,
        demographics_basis: DemographicsBasis,
    ) -> Self {
        Self {
            corpus_path,
            outcome_resolution,
            demographics_basis,
        }
    }

    pub fn corpus_path(&self) -> Option<&Path> {
        self.corpus_path.as_deref()
    }

    pub fn outcome_resolution(&self) -> OutcomeResolution {
        self.outcome_resolution
    }

    pub fn demographics_basis(&self) -> DemographicsBasis {
        self.demographics_basis
    }

    pub fn with_outcome_resolution(mut self, outcome_resolution: OutcomeResolution) -> Self {
        self.outcome_resolution = outcome_resolution;
        self
    }

    pub fn with_demographics_basis(mut self, demographics_basis: DemographicsBasis) -> Self {
        self.demographics_basis = demographics_basis;
        self
    }
}

/// Parse an optional corpus path from an environment value.
///
/// `None` or blank means "no corpus configured".
pub fn corpus_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    non_blank(value).map(PathBuf::from)
}

/// Parse the outcome resolution policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`OutcomeResolution::Id`].
pub fn outcome_resolution_from_env_value(value: Option<String>) -> EngineResult<OutcomeResolution> {
    let parsed = non_blank(value).map(|v| v.parse()).transpose()?;
    Ok(parsed.unwrap_or_default())
}

/// Parse the demographics basis from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DemographicsBasis::Illustrative`].
pub fn demographics_basis_from_env_value(value: Option<String>) -> EngineResult<DemographicsBasis> {
    let parsed = non_blank(value).map(|v| v.parse()).transpose()?;
    Ok(parsed.unwrap_or_default())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
