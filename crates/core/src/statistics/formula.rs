//! Per-formula statistics and formula comparison.
//!
//! These operations filter the corpus by formula name; they do not score anything.

use std::collections::BTreeMap;

use casematch_types::{NonEmptyText, Percent};
use casematch_wire::CaseRecord;
use serde::Serialize;

use super::demographics::SymptomCount;
use super::CaseStatisticsService;
use crate::constants::TOP_SYMPTOMS;
use crate::outcome::{ConfidenceLevel, OutcomeDistribution};
use crate::tally::Tally;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaStatistics {
    pub formula_name: String,
    pub formula_hanja: Option<String>,
    pub total_cases: usize,
    pub success_rate: Percent,
    pub outcome_distribution: OutcomeDistribution,
    pub confidence_level: ConfidenceLevel,
    pub average_treatment_duration: &'static str,
    /// Mean age of cases that record one, rounded to whole years.
    pub average_age: Option<u32>,
    pub by_constitution: BTreeMap<String, usize>,
    pub common_symptoms: Vec<SymptomCount>,
}

/// One row of a formula comparison. Formulas absent from the corpus get a zeroed row with
/// `found == false`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaComparisonEntry {
    pub formula_name: String,
    pub found: bool,
    pub total_cases: usize,
    pub success_rate: Percent,
    pub confidence_level: ConfidenceLevel,
}

impl FormulaComparisonEntry {
    fn missing(name: &str) -> Self {
        Self {
            formula_name: name.to_string(),
            found: false,
            total_cases: 0,
            success_rate: Percent::ZERO,
            confidence_level: ConfidenceLevel::Low,
        }
    }
}

impl From<&FormulaStatistics> for FormulaComparisonEntry {
    fn from(stats: &FormulaStatistics) -> Self {
        Self {
            formula_name: stats.formula_name.clone(),
            found: true,
            total_cases: stats.total_cases,
            success_rate: stats.success_rate,
            confidence_level: stats.confidence_level,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaRecommendation {
    pub formula_name: String,
    pub success_rate: Percent,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonChart {
    pub labels: Vec<String>,
    pub success_rates: Vec<Percent>,
    pub case_counts: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaComparison {
    pub formulas: Vec<FormulaComparisonEntry>,
    pub recommendation: Option<FormulaRecommendation>,
    pub chart: ComparisonChart,
}

impl CaseStatisticsService {
    /// Statistics for every case prescribed `name` (matched on name or hanja).
    ///
    /// Returns `None` when the name is blank or no case uses the formula.
    pub fn formula_statistics(&self, name: &str) -> Option<FormulaStatistics> {
        let name = NonEmptyText::new(name).ok()?;
        let cases: Vec<&CaseRecord> = self
            .corpus
            .records()
            .iter()
            .filter(|r| prescribes(r, name.as_str()))
            .collect();
        if cases.is_empty() {
            tracing::debug!(formula = %name, "formula not found in corpus");
            return None;
        }

        let outcomes = OutcomeDistribution::from_records(cases.iter().copied());

        let ages: Vec<u32> = cases.iter().filter_map(|r| r.patient_age).collect();
        let average_age = (!ages.is_empty()).then(|| {
            let sum: u64 = ages.iter().map(|&a| u64::from(a)).sum();
            (sum as f64 / ages.len() as f64).round() as u32
        });

        let mut by_constitution = BTreeMap::new();
        for constitution in cases.iter().filter_map(|r| r.constitution()) {
            *by_constitution
                .entry(constitution.to_string())
                .or_insert(0usize) += 1;
        }

        let symptoms: Tally = cases
            .iter()
            .flat_map(|r| r.symptoms.iter().map(String::as_str))
            .collect();

        let formula_hanja = cases
            .iter()
            .find_map(|r| NonEmptyText::from_optional(r.formula_hanja.as_deref()))
            .map(NonEmptyText::into_string);

        Some(FormulaStatistics {
            formula_name: name.into_string(),
            formula_hanja,
            total_cases: cases.len(),
            success_rate: outcomes.success_rate_or_default(),
            outcome_distribution: outcomes,
            confidence_level: ConfidenceLevel::for_case_count(cases.len()),
            average_treatment_duration: outcomes.duration_label(),
            average_age,
            by_constitution,
            common_symptoms: SymptomCount::ranked(&symptoms, TOP_SYMPTOMS),
        })
    }

    /// Compare formulas side by side and recommend the one with the highest success rate.
    ///
    /// Every requested name gets exactly one entry, in input order. On equal success rates
    /// the earlier name is recommended.
    pub fn compare_formulas(&self, names: &[String]) -> FormulaComparison {
        let formulas: Vec<FormulaComparisonEntry> = names
            .iter()
            .map(|name| match self.formula_statistics(name) {
                Some(stats) => FormulaComparisonEntry::from(&stats),
                None => FormulaComparisonEntry::missing(name),
            })
            .collect();

        let mut best: Option<&FormulaComparisonEntry> = None;
        for entry in &formulas {
            if best.map_or(true, |b| entry.success_rate > b.success_rate) {
                best = Some(entry);
            }
        }
        let recommendation = best.map(|entry| FormulaRecommendation {
            formula_name: entry.formula_name.clone(),
            success_rate: entry.success_rate,
            reason: format!(
                "비교 대상 중 성공률이 가장 높음 ({}%, {}건)",
                entry.success_rate.value(),
                entry.total_cases
            ),
        });

        let chart = ComparisonChart {
            labels: formulas.iter().map(|e| e.formula_name.clone()).collect(),
            success_rates: formulas.iter().map(|e| e.success_rate).collect(),
            case_counts: formulas.iter().map(|e| e.total_cases).collect(),
        };

        FormulaComparison {
            formulas,
            recommendation,
            chart,
        }
    }
}

fn prescribes(record: &CaseRecord, name: &str) -> bool {
    [record.formula_name.as_deref(), record.formula_hanja.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| field.trim() == name)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::clinic;
    use super::*;

    #[test]
    fn statistics_for_known_formula() {
        let stats = clinic().formula_statistics("이중탕").unwrap();
        assert_eq!(stats.total_cases, 3);
        assert_eq!(stats.outcome_distribution.cured, 2);
        assert_eq!(stats.outcome_distribution.no_change, 1);
        assert_eq!(stats.success_rate.value(), 67);
        assert_eq!(stats.confidence_level, ConfidenceLevel::Low);
        // Ages 42 and 51; c6 has none.
        assert_eq!(stats.average_age, Some(47));
        assert_eq!(stats.by_constitution.get("소음인"), Some(&2));
        assert_eq!(stats.common_symptoms[0].symptom, "복통");
        assert_eq!(stats.common_symptoms[0].count, 2);
    }

    #[test]
    fn unknown_or_blank_formula_is_none() {
        let svc = clinic();
        assert!(svc.formula_statistics("존재하지않는처방").is_none());
        assert!(svc.formula_statistics("   ").is_none());
        assert!(svc.formula_statistics("이중").is_none());
    }

    #[test]
    fn matches_on_hanja() {
        let record = CaseRecord {
            formula_name: Some("이중탕".into()),
            formula_hanja: Some("理中湯".into()),
            ..CaseRecord::new("h1", "복통")
        };
        let svc = super::super::CaseStatisticsService::new(
            std::sync::Arc::new(crate::corpus::CorpusStore::new(vec![record])),
            std::sync::Arc::new(crate::config::CoreConfig::default()),
        );
        let stats = svc.formula_statistics("理中湯").unwrap();
        assert_eq!(stats.total_cases, 1);
        assert_eq!(stats.formula_hanja.as_deref(), Some("理中湯"));
    }

    #[test]
    fn compare_returns_one_entry_per_name() {
        let names = vec!["없는처방".to_string(), "또없는처방".to_string()];
        let comparison = clinic().compare_formulas(&names);
        assert_eq!(comparison.formulas.len(), 2);
        assert!(comparison.formulas.iter().all(|e| !e.found));
        assert_eq!(
            comparison.recommendation.unwrap().formula_name,
            "없는처방"
        );
        assert_eq!(comparison.chart.case_counts, vec![0, 0]);
    }

    #[test]
    fn compare_recommends_highest_success_rate() {
        let names = vec![
            "오수유탕".to_string(),
            "이중탕".to_string(),
            "갈근탕".to_string(),
        ];
        let comparison = clinic().compare_formulas(&names);
        let rates: Vec<u8> = comparison
            .formulas
            .iter()
            .map(|e| e.success_rate.value())
            .collect();
        // 오수유탕: worsened; 이중탕: 2 of 3; 갈근탕: improved.
        assert_eq!(rates, vec![0, 67, 100]);
        let recommendation = comparison.recommendation.unwrap();
        assert_eq!(recommendation.formula_name, "갈근탕");
        assert_eq!(comparison.chart.labels, names);
    }

    #[test]
    fn compare_ties_go_to_first_name() {
        let names = vec!["반하사심탕".to_string(), "갈근탕".to_string()];
        let comparison = clinic().compare_formulas(&names);
        // Both at 100: an unknown outcome counts as improved.
        assert_eq!(
            comparison.recommendation.unwrap().formula_name,
            "반하사심탕"
        );
    }

    #[test]
    fn compare_nothing() {
        let comparison = clinic().compare_formulas(&[]);
        assert!(comparison.formulas.is_empty());
        assert!(comparison.recommendation.is_none());
        assert_eq!(comparison.chart, ComparisonChart::default());
    }
}
