//! Treatment outcome aggregation over a matched set.
//!
//! Outcome policy:
//! - `cured`, `improved`, `no_change` and `worsened` are counted as recorded
//! - a record with an unknown or missing outcome is counted as `improved`
//! - a candidate whose canonical record cannot be resolved counts as unknown, and so as
//!   `improved`; every matched candidate contributes exactly one outcome
//! - a candidate borrowed from the corpus is its own canonical record, so duplicate ids never
//!   swap outcomes between cases
//!
//! An empty distribution has a success rate of 85, always paired with the confidence level of
//! the matched set so callers can see it is not a measurement.

use casematch_types::Percent;
use casematch_wire::{CaseRecord, TreatmentOutcome};
use serde::Serialize;

use crate::config::OutcomeResolution;
use crate::constants::{
    DEFAULT_SUCCESS_RATE, DURATION_CURED_DOMINANT, DURATION_DEFAULT, DURATION_SLOW_RESPONSE,
    HIGH_CONFIDENCE_CASES, MEDIUM_CONFIDENCE_CASES, MIN_FORMULA_CASES, TOP_SUCCESSFUL_FORMULAS,
};
use crate::corpus::CorpusStore;
use crate::ranker::ScoredCandidate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDistribution {
    pub cured: usize,
    pub improved: usize,
    pub no_change: usize,
    pub worsened: usize,
}

impl OutcomeDistribution {
    /// Count the outcomes of records that need no resolution step.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CaseRecord>) -> Self {
        let mut dist = Self::default();
        for record in records {
            dist.add(record.treatment_outcome);
        }
        dist
    }

    pub fn add(&mut self, outcome: TreatmentOutcome) {
        match outcome {
            TreatmentOutcome::Cured => self.cured += 1,
            TreatmentOutcome::Improved | TreatmentOutcome::Unknown => self.improved += 1,
            TreatmentOutcome::NoChange => self.no_change += 1,
            TreatmentOutcome::Worsened => self.worsened += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.cured + self.improved + self.no_change + self.worsened
    }

    /// Cured plus improved over all counted outcomes, or `None` when nothing was counted.
    pub fn success_rate(&self) -> Option<Percent> {
        Percent::from_ratio(self.cured + self.improved, self.total())
    }

    /// Success rate with the conservative default for an empty distribution.
    pub fn success_rate_or_default(&self) -> Percent {
        self.success_rate()
            .unwrap_or(Percent::clamped(DEFAULT_SUCCESS_RATE))
    }

    /// Illustrative treatment-duration bucket. Not a measured duration.
    pub fn duration_label(&self) -> &'static str {
        if self.cured * 2 > self.total() {
            DURATION_CURED_DOMINANT
        } else if self.no_change + self.worsened > 0 {
            DURATION_SLOW_RESPONSE
        } else {
            DURATION_DEFAULT
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn for_case_count(cases: usize) -> Self {
        if cases >= HIGH_CONFIDENCE_CASES {
            Self::High
        } else if cases >= MEDIUM_CONFIDENCE_CASES {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaSuccessStat {
    pub formula_name: String,
    pub case_count: usize,
    pub success_rate: Percent,
}

/// Aggregated outcomes of a matched set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSummary {
    pub matched_cases: usize,
    pub outcome_distribution: OutcomeDistribution,
    pub total_with_outcome: usize,
    pub success_rate: Percent,
    pub confidence_level: ConfidenceLevel,
    pub top_formulas: Vec<FormulaSuccessStat>,
    pub average_treatment_duration: &'static str,
}

pub struct OutcomeAggregator<'c> {
    corpus: &'c CorpusStore,
    resolution: OutcomeResolution,
}

impl<'c> OutcomeAggregator<'c> {
    pub fn new(corpus: &'c CorpusStore, resolution: OutcomeResolution) -> Self {
        Self { corpus, resolution }
    }

    pub fn aggregate(&self, matched: &[ScoredCandidate<'_>]) -> OutcomeSummary {
        let mut distribution = OutcomeDistribution::default();
        // Per formula: (name, matched cases, outcomes of those cases), in first-seen order.
        let mut formulas: Vec<(&str, usize, OutcomeDistribution)> = Vec::new();

        for candidate in matched {
            let outcome = self
                .resolve(candidate.record)
                .map_or(TreatmentOutcome::Unknown, |r| r.treatment_outcome);
            distribution.add(outcome);

            let Some(name) = candidate.record.formula().map(str::trim) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let slot = match formulas.iter().position(|(n, _, _)| *n == name) {
                Some(i) => i,
                None => {
                    formulas.push((name, 0, OutcomeDistribution::default()));
                    formulas.len() - 1
                }
            };
            formulas[slot].1 += 1;
            formulas[slot].2.add(outcome);
        }

        let mut top_formulas: Vec<FormulaSuccessStat> = formulas
            .into_iter()
            .filter(|(_, count, _)| *count >= MIN_FORMULA_CASES)
            .map(|(name, count, outcomes)| FormulaSuccessStat {
                formula_name: name.to_string(),
                case_count: count,
                success_rate: outcomes.success_rate_or_default(),
            })
            .collect();
        top_formulas.sort_by(|a, b| b.case_count.cmp(&a.case_count));
        top_formulas.truncate(TOP_SUCCESSFUL_FORMULAS);

        tracing::debug!(
            matched = matched.len(),
            with_outcome = distribution.total(),
            formulas = top_formulas.len(),
            "aggregated outcomes"
        );

        OutcomeSummary {
            matched_cases: matched.len(),
            total_with_outcome: distribution.total(),
            success_rate: distribution.success_rate_or_default(),
            confidence_level: ConfidenceLevel::for_case_count(matched.len()),
            average_treatment_duration: distribution.duration_label(),
            outcome_distribution: distribution,
            top_formulas,
        }
    }

    fn resolve<'r>(&self, record: &'r CaseRecord) -> Option<&'r CaseRecord>
    where
        'c: 'r,
    {
        if self
            .corpus
            .records()
            .as_ptr_range()
            .contains(&std::ptr::from_ref(record))
        {
            return Some(record);
        }
        if let Some(found) = self.corpus.get(&record.id) {
            return Some(found);
        }
        match self.resolution {
            OutcomeResolution::Id => None,
            OutcomeResolution::IdThenChiefComplaint => {
                self.corpus.first_with_chief_complaint(&record.chief_complaint)
            }
        }
    }
}
