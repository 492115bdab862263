//! Demographic and corpus-wide statistics.
//!
//! With [`DemographicsBasis::Illustrative`] every breakdown is a fixed population share scaled
//! to the corpus size. [`DemographicsBasis::Observed`] counts the age, gender and constitution
//! the records actually carry; body heat and strength have no record field and stay
//! illustrative either way. The response always states its basis.

use std::collections::BTreeMap;

use casematch_types::Percent;
use casematch_wire::CaseRecord;
use serde::Serialize;

use super::CaseStatisticsService;
use crate::config::DemographicsBasis;
use crate::constants::{
    ILLUSTRATIVE_AGE_RATIOS, ILLUSTRATIVE_BODY_HEAT_RATIOS, ILLUSTRATIVE_BODY_STRENGTH_RATIOS,
    ILLUSTRATIVE_CONSTITUTION_RATIOS, ILLUSTRATIVE_GENDER_RATIOS, TOP_CORPUS_FORMULAS,
    TOP_SYMPTOMS, UNKNOWN_BUCKET,
};
use crate::corpus::FormulaCount;
use crate::outcome::{ConfidenceLevel, OutcomeDistribution};
use crate::tally::Tally;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SymptomCount {
    pub symptom: String,
    pub count: usize,
}

impl SymptomCount {
    pub(crate) fn ranked(tally: &Tally<'_>, limit: usize) -> Vec<Self> {
        tally
            .ranked(limit)
            .into_iter()
            .map(|(symptom, count)| Self {
                symptom: symptom.to_string(),
                count,
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DemographicBucket {
    pub label: String,
    pub count: usize,
    pub percentage: Percent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicStatistics {
    pub basis: DemographicsBasis,
    pub total_cases: usize,
    pub age_groups: Vec<DemographicBucket>,
    pub gender: Vec<DemographicBucket>,
    pub constitution: Vec<DemographicBucket>,
    pub body_heat: Vec<DemographicBucket>,
    pub body_strength: Vec<DemographicBucket>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveStatistics {
    pub total_cases: usize,
    pub outcome_distribution: OutcomeDistribution,
    pub success_rate: Percent,
    pub confidence_level: ConfidenceLevel,
    pub top_formulas: Vec<FormulaCount>,
    pub top_symptoms: Vec<SymptomCount>,
    pub by_data_source: BTreeMap<String, usize>,
    pub demographics: DemographicStatistics,
}

impl CaseStatisticsService {
    pub fn demographic_statistics(&self) -> DemographicStatistics {
        let records = self.corpus.records();
        let total = records.len();
        let basis = self.cfg.demographics_basis();

        let (age_groups, gender, constitution) = match basis {
            DemographicsBasis::Illustrative => (
                illustrative(&ILLUSTRATIVE_AGE_RATIOS, total),
                illustrative(&ILLUSTRATIVE_GENDER_RATIOS, total),
                illustrative(&ILLUSTRATIVE_CONSTITUTION_RATIOS, total),
            ),
            DemographicsBasis::Observed => (
                observed(&ILLUSTRATIVE_AGE_RATIOS, records, age_group),
                observed(&ILLUSTRATIVE_GENDER_RATIOS, records, gender_label),
                observed(&ILLUSTRATIVE_CONSTITUTION_RATIOS, records, |r| {
                    r.constitution().map(str::trim)
                }),
            ),
        };

        tracing::debug!(?basis, total, "demographic statistics");

        DemographicStatistics {
            basis,
            total_cases: total,
            age_groups,
            gender,
            constitution,
            body_heat: illustrative(&ILLUSTRATIVE_BODY_HEAT_RATIOS, total),
            body_strength: illustrative(&ILLUSTRATIVE_BODY_STRENGTH_RATIOS, total),
        }
    }

    /// Corpus-wide rollup: outcomes, leading formulas and symptoms, sources and demographics.
    pub fn comprehensive_statistics(&self) -> ComprehensiveStatistics {
        let records = self.corpus.records();
        let outcomes = OutcomeDistribution::from_records(records);

        let formulas: Tally = records.iter().filter_map(CaseRecord::formula).collect();
        let symptoms: Tally = records
            .iter()
            .flat_map(|r| r.symptoms.iter().map(String::as_str))
            .collect();

        let mut by_data_source = BTreeMap::new();
        for record in records {
            *by_data_source
                .entry(record.data_source.clone())
                .or_insert(0usize) += 1;
        }

        ComprehensiveStatistics {
            total_cases: records.len(),
            success_rate: outcomes.success_rate().unwrap_or(Percent::ZERO),
            outcome_distribution: outcomes,
            confidence_level: ConfidenceLevel::for_case_count(records.len()),
            top_formulas: formulas
                .ranked(TOP_CORPUS_FORMULAS)
                .into_iter()
                .map(|(formula, count)| FormulaCount {
                    formula: formula.to_string(),
                    count,
                })
                .collect(),
            top_symptoms: SymptomCount::ranked(&symptoms, TOP_SYMPTOMS),
            by_data_source,
            demographics: self.demographic_statistics(),
        }
    }
}

fn illustrative(ratios: &[(&str, f64)], total: usize) -> Vec<DemographicBucket> {
    ratios
        .iter()
        .map(|&(label, ratio)| DemographicBucket {
            label: label.to_string(),
            count: (total as f64 * ratio).round() as usize,
            percentage: Percent::clamped((ratio * 100.0).round() as i64),
        })
        .collect()
}

/// Count records into the labelled buckets of `ratios`; anything else lands in the unknown
/// bucket, which is only reported when non-empty.
fn observed<'r>(
    ratios: &[(&str, f64)],
    records: &'r [CaseRecord],
    classify: impl Fn(&'r CaseRecord) -> Option<&'r str>,
) -> Vec<DemographicBucket> {
    let mut counts = vec![0usize; ratios.len()];
    let mut unknown = 0usize;
    for record in records {
        match classify(record).and_then(|label| ratios.iter().position(|(l, _)| *l == label)) {
            Some(i) => counts[i] += 1,
            None => unknown += 1,
        }
    }

    let total = records.len();
    let bucket = |label: &str, count: usize| DemographicBucket {
        label: label.to_string(),
        count,
        percentage: Percent::from_ratio(count, total).unwrap_or(Percent::ZERO),
    };

    let mut buckets: Vec<DemographicBucket> = ratios
        .iter()
        .zip(counts)
        .map(|(&(label, _), count)| bucket(label, count))
        .collect();
    if unknown > 0 {
        buckets.push(bucket(UNKNOWN_BUCKET, unknown));
    }
    buckets
}

fn age_group(record: &CaseRecord) -> Option<&str> {
    let label = match record.patient_age? {
        0..=19 => "20세 미만",
        20..=29 => "20대",
        30..=39 => "30대",
        40..=49 => "40대",
        50..=59 => "50대",
        _ => "60세 이상",
    };
    Some(label)
}

fn gender_label(record: &CaseRecord) -> Option<&str> {
    let raw = record.patient_gender.as_deref()?.trim().to_lowercase();
    match raw.as_str() {
        "m" | "male" | "man" | "남" | "남성" | "남자" => Some("남성"),
        "f" | "female" | "woman" | "여" | "여성" | "여자" => Some("여성"),
        _ => None,
    }
}
