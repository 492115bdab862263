//! Similarity scoring for a (query, record) pair.
//!
//! A score has two parts:
//! - keyword overlap (up to 60 points): the share of query terms that appear in, or contain,
//!   some term of the record
//! - metadata agreement (up to 40 points): constitution, gender and age, averaged over the
//!   fields the query actually supplies
//!
//! A query without any demographic field gets the neutral metadata score of 20 so that it is
//! not ranked below an otherwise identical query that does supply demographics.

use casematch_types::NonEmptyText;
use casematch_wire::CaseRecord;
use serde::Serialize;

use crate::constants::{
    AGE_CLOSE_YEARS, AGE_NEAR_YEARS, KEYWORD_WEIGHT, MAX_SCORE, METADATA_WEIGHT,
    NEUTRAL_METADATA_SCORE,
};
use crate::grade::Grade;
use crate::query::Query;

/// Similarity of one record to a query.
///
/// `total == min(100, keyword_match + metadata_match)`, all three carried to one decimal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub total: f64,
    pub grade: Grade,
    pub grade_label: &'static str,
    pub keyword_match: f64,
    pub metadata_match: f64,
}

impl MatchScore {
    pub(crate) fn from_components(keyword: f64, metadata: f64) -> Self {
        let keyword_match = round1(clamp_or_zero(keyword, KEYWORD_WEIGHT));
        let metadata_match = round1(clamp_or_zero(metadata, METADATA_WEIGHT));
        let total = round1(keyword_match + metadata_match).min(MAX_SCORE);
        let grade = Grade::for_score(total);

        Self {
            total,
            grade,
            grade_label: grade.label(),
            keyword_match,
            metadata_match,
        }
    }
}

/// Scores records against one prepared query.
///
/// Query terms are normalised once here, so scoring a whole corpus does not repeat the work.
#[derive(Clone, Debug)]
pub struct MatchScorer {
    query_terms: Vec<String>,
    age: Option<u32>,
    gender: Option<NonEmptyText>,
    constitution: Option<NonEmptyText>,
}

impl MatchScorer {
    pub fn new(query: &Query) -> Self {
        let mut query_terms: Vec<String> = Vec::new();
        let candidates = std::iter::once(query.chief_complaint.as_str())
            .chain(query.symptoms.iter().map(|s| s.name.as_str()));
        for term in candidates.filter_map(normalise_term) {
            if !query_terms.contains(&term) {
                query_terms.push(term);
            }
        }

        Self {
            query_terms,
            age: query.patient_info.age,
            gender: query.patient_info.gender(),
            constitution: query.patient_info.constitution(),
        }
    }

    /// Lowercased, de-duplicated, non-blank query terms.
    pub fn query_terms(&self) -> &[String] {
        &self.query_terms
    }

    pub fn score(&self, record: &CaseRecord) -> MatchScore {
        MatchScore::from_components(self.keyword_match(record), self.metadata_match(record))
    }

    fn keyword_match(&self, record: &CaseRecord) -> f64 {
        if self.query_terms.is_empty() {
            return 0.0;
        }

        let case_terms: Vec<String> = std::iter::once(record.chief_complaint.as_str())
            .chain(record.symptoms.iter().map(String::as_str))
            .chain(record.diagnosis.as_deref())
            .filter_map(normalise_term)
            .collect();

        let matched = self
            .query_terms
            .iter()
            .filter(|q| {
                case_terms
                    .iter()
                    .any(|c| c.contains(q.as_str()) || q.contains(c.as_str()))
            })
            .count();

        matched as f64 / self.query_terms.len() as f64 * KEYWORD_WEIGHT
    }

    fn metadata_match(&self, record: &CaseRecord) -> f64 {
        let mut supplied = 0u32;
        let mut agreement = 0.0;

        if let Some(constitution) = &self.constitution {
            supplied += 1;
            if record.constitution().map(str::trim) == Some(constitution.as_str()) {
                agreement += 1.0;
            }
        }

        if let Some(gender) = &self.gender {
            supplied += 1;
            if record.patient_gender.as_deref().map(str::trim) == Some(gender.as_str()) {
                agreement += 1.0;
            }
        }

        if let Some(age) = self.age {
            supplied += 1;
            if let Some(case_age) = record.patient_age {
                let diff = age.abs_diff(case_age);
                if diff <= AGE_CLOSE_YEARS {
                    agreement += 1.0;
                } else if diff <= AGE_NEAR_YEARS {
                    agreement += 0.5;
                }
            }
        }

        if supplied == 0 {
            return NEUTRAL_METADATA_SCORE;
        }
        agreement / f64::from(supplied) * METADATA_WEIGHT
    }
}

/// Score a single (query, record) pair.
pub fn score(query: &Query, record: &CaseRecord) -> MatchScore {
    MatchScorer::new(query).score(record)
}

fn normalise_term(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn clamp_or_zero(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
