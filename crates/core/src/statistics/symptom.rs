//! Per-symptom statistics.
//!
//! Two different success measures appear here and must not be confused:
//! - `success_rate` is outcome based, like every other success rate in the engine
//! - `search_score_success_rate` on each formula is the share of that formula's matched cases
//!   whose search score reached 60. It says how well the cases fit the symptom, not how the
//!   treatment went.

use casematch_types::Percent;
use serde::Serialize;

use super::demographics::SymptomCount;
use super::CaseStatisticsService;
use crate::constants::{
    SEARCH_SCORE_SUCCESS_THRESHOLD, SYMPTOM_STATS_MIN_CONFIDENCE, SYMPTOM_STATS_TOP_K,
    TOP_SYMPTOMS, TOP_SYMPTOM_FORMULAS,
};
use crate::outcome::{ConfidenceLevel, OutcomeDistribution};
use crate::query::Query;
use crate::ranker::Ranker;
use crate::tally::Tally;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomFormulaStat {
    pub formula_name: String,
    pub case_count: usize,
    pub search_score_success_rate: Percent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomStatistics {
    pub symptom: String,
    pub total_cases: usize,
    pub success_rate: Percent,
    pub outcome_distribution: OutcomeDistribution,
    pub confidence_level: ConfidenceLevel,
    pub top_formulas: Vec<SymptomFormulaStat>,
    pub co_occurring_symptoms: Vec<SymptomCount>,
}

impl CaseStatisticsService {
    /// Statistics over the cases a symptom-only query for `name` matches.
    pub fn symptom_statistics(&self, name: &str) -> SymptomStatistics {
        let symptom = name.trim();
        let query = Query::symptom_only(symptom);
        let matched = self.rank_with(
            &query,
            Ranker::new(SYMPTOM_STATS_MIN_CONFIDENCE, SYMPTOM_STATS_TOP_K),
        );

        let (outcome_distribution, success_rate) = if matched.is_empty() {
            (OutcomeDistribution::default(), Percent::ZERO)
        } else {
            let summary = self.aggregator().aggregate(&matched);
            (summary.outcome_distribution, summary.success_rate)
        };

        // (formula, matched cases, cases scoring at least the threshold), first-seen order.
        let mut formulas: Vec<(&str, usize, usize)> = Vec::new();
        for candidate in &matched {
            let Some(formula) = candidate.record.formula().map(str::trim) else {
                continue;
            };
            if formula.is_empty() {
                continue;
            }
            let slot = match formulas.iter().position(|(f, _, _)| *f == formula) {
                Some(i) => i,
                None => {
                    formulas.push((formula, 0, 0));
                    formulas.len() - 1
                }
            };
            formulas[slot].1 += 1;
            if candidate.score.total >= SEARCH_SCORE_SUCCESS_THRESHOLD {
                formulas[slot].2 += 1;
            }
        }
        formulas.sort_by(|a, b| b.1.cmp(&a.1));
        let top_formulas = formulas
            .into_iter()
            .take(TOP_SYMPTOM_FORMULAS)
            .map(|(formula, count, high)| SymptomFormulaStat {
                formula_name: formula.to_string(),
                case_count: count,
                search_score_success_rate: Percent::from_ratio(high, count)
                    .unwrap_or(Percent::ZERO),
            })
            .collect();

        let queried = symptom.to_lowercase();
        let co_occurring: Tally = matched
            .iter()
            .flat_map(|c| c.record.symptoms.iter().map(String::as_str))
            .filter(|s| !overlaps(s, &queried))
            .collect();

        tracing::debug!(symptom, matched = matched.len(), "symptom statistics");

        SymptomStatistics {
            symptom: symptom.to_string(),
            total_cases: matched.len(),
            success_rate,
            outcome_distribution,
            confidence_level: ConfidenceLevel::for_case_count(matched.len()),
            top_formulas,
            co_occurring_symptoms: SymptomCount::ranked(&co_occurring, TOP_SYMPTOMS),
        }
    }
}

/// Whether `candidate` is the queried symptom or a variant of it (substring either way).
fn overlaps(candidate: &str, queried_lower: &str) -> bool {
    let candidate = candidate.trim().to_lowercase();
    if candidate.is_empty() || queried_lower.is_empty() {
        return false;
    }
    candidate.contains(queried_lower) || queried_lower.contains(candidate.as_str())
}
