//! Case statistics service.
//!
//! `CaseStatisticsService` is the public entry point consumed by the HTTP layer and the CLI.
//! It owns no mutable state: every operation is a pure function of its arguments and the
//! shared corpus, so repeated calls return identical results.

mod chart;
mod demographics;
mod formula;
mod symptom;

use std::sync::Arc;
use std::time::Instant;

use casematch_types::Percent;
use casematch_wire::CaseRecord;
use serde::Serialize;

use crate::config::CoreConfig;
use crate::constants::{SUCCESS_STATS_MIN_CONFIDENCE, SUCCESS_STATS_TOP_K};
use crate::corpus::{CaseListing, CorpusStatistics, CorpusStore, ListCasesRequest};
use crate::explain::{explain, MatchReason};
use crate::outcome::{ConfidenceLevel, FormulaSuccessStat, OutcomeAggregator, OutcomeDistribution};
use crate::query::Query;
use crate::ranker::{score_corpus, Ranker, ScoredCandidate};
use crate::scorer::MatchScore;

pub use chart::{ChartData, ChartDataset, ChartType};
pub use demographics::{
    ComprehensiveStatistics, DemographicBucket, DemographicStatistics, SymptomCount,
};
pub use formula::{
    ComparisonChart, FormulaComparison, FormulaComparisonEntry, FormulaRecommendation,
    FormulaStatistics,
};
pub use symptom::{SymptomFormulaStat, SymptomStatistics};

/// Pure statistics operations over a shared corpus - no API concerns.
#[derive(Clone)]
pub struct CaseStatisticsService {
    corpus: Arc<CorpusStore>,
    cfg: Arc<CoreConfig>,
}

impl CaseStatisticsService {
    pub fn new(corpus: Arc<CorpusStore>, cfg: Arc<CoreConfig>) -> Self {
        Self { corpus, cfg }
    }

    /// Load the configured corpus (degrading to empty) and build a service around it.
    pub fn from_config(cfg: Arc<CoreConfig>) -> Self {
        let corpus = Arc::new(CorpusStore::load_or_empty(cfg.corpus_path()));
        Self::new(corpus, cfg)
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Rank the corpus against `query` and explain each result.
    pub fn search(&self, query: &Query) -> SearchResponse {
        let started = Instant::now();
        let ranker = Ranker::from_options(&query.options);
        let ranked = ranker.rank(score_corpus(query, &self.corpus));

        let results: Vec<MatchedCase> = ranked
            .into_iter()
            .map(|candidate| MatchedCase {
                match_reasons: explain(query, candidate.record),
                case: candidate.record.clone(),
                match_score: candidate.score,
            })
            .collect();

        tracing::debug!(
            results = results.len(),
            top_k = ranker.top_k(),
            min_confidence = ranker.min_confidence(),
            "search complete"
        );

        SearchResponse {
            total_found: results.len(),
            results,
            search_metadata: SearchMetadata {
                processing_time_ms: started.elapsed().as_millis() as u64,
                query_text: query.query_text(),
            },
        }
    }

    /// Outcome statistics over the cases most similar to `query`.
    ///
    /// Uses a wide candidate pool (top 200 with score at least 30) regardless of the query's own
    /// search options.
    pub fn similar_case_success_stats(&self, query: &Query) -> SimilarCaseStats {
        let matched = self.rank_with(
            query,
            Ranker::new(SUCCESS_STATS_MIN_CONFIDENCE, SUCCESS_STATS_TOP_K),
        );
        let match_criteria = match_criteria(query);

        if matched.is_empty() {
            return SimilarCaseStats {
                total_similar_cases: 0,
                success_rate: Percent::ZERO,
                outcome_breakdown: OutcomeDistribution::default(),
                average_treatment_duration: OutcomeDistribution::default().duration_label(),
                top_successful_formulas: Vec::new(),
                confidence_level: ConfidenceLevel::Low,
                match_criteria,
            };
        }

        let summary = self.aggregator().aggregate(&matched);
        SimilarCaseStats {
            total_similar_cases: summary.matched_cases,
            success_rate: summary.success_rate,
            outcome_breakdown: summary.outcome_distribution,
            average_treatment_duration: summary.average_treatment_duration,
            top_successful_formulas: summary.top_formulas,
            confidence_level: summary.confidence_level,
            match_criteria,
        }
    }

    pub fn statistics(&self) -> CorpusStatistics {
        self.corpus.statistics()
    }

    pub fn list_cases(&self, request: &ListCasesRequest) -> CaseListing {
        self.corpus.list_cases(request)
    }

    fn rank_with(&self, query: &Query, ranker: Ranker) -> Vec<ScoredCandidate<'_>> {
        ranker.rank(score_corpus(query, &self.corpus))
    }

    fn aggregator(&self) -> OutcomeAggregator<'_> {
        OutcomeAggregator::new(&self.corpus, self.cfg.outcome_resolution())
    }
}

/// Which query dimensions were supplied, as display strings.
fn match_criteria(query: &Query) -> Vec<String> {
    let mut criteria = Vec::new();

    let chief_complaint = query.chief_complaint.trim();
    if !chief_complaint.is_empty() {
        criteria.push(format!("주소증: {chief_complaint}"));
    }

    let symptoms: Vec<&str> = query.symptom_names().collect();
    if !symptoms.is_empty() {
        criteria.push(format!("증상: {}", symptoms.join(", ")));
    }

    let info = &query.patient_info;
    if let Some(constitution) = info.constitution() {
        criteria.push(format!("체질: {constitution}"));
    }
    if let Some(gender) = info.gender() {
        criteria.push(format!("성별: {gender}"));
    }
    if let Some(age) = info.age {
        criteria.push(format!("연령: {age}세 (±10세)"));
    }

    criteria
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedCase {
    #[serde(flatten)]
    pub case: CaseRecord,
    pub match_score: MatchScore,
    pub match_reasons: Vec<MatchReason>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub processing_time_ms: u64,
    pub query_text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<MatchedCase>,
    pub total_found: usize,
    pub search_metadata: SearchMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarCaseStats {
    pub total_similar_cases: usize,
    pub success_rate: Percent,
    pub outcome_breakdown: OutcomeDistribution,
    pub average_treatment_duration: &'static str,
    pub top_successful_formulas: Vec<FormulaSuccessStat>,
    pub confidence_level: ConfidenceLevel,
    pub match_criteria: Vec<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use casematch_wire::TreatmentOutcome;

    pub(crate) struct Case<'a> {
        pub id: &'a str,
        pub cc: &'a str,
        pub symptoms: &'a [&'a str],
        pub age: Option<u32>,
        pub gender: Option<&'a str>,
        pub constitution: Option<&'a str>,
        pub formula: Option<&'a str>,
        pub outcome: TreatmentOutcome,
    }

    impl<'a> Case<'a> {
        pub(crate) fn new(id: &'a str, cc: &'a str) -> Self {
            Self {
                id,
                cc,
                symptoms: &[],
                age: None,
                gender: None,
                constitution: None,
                formula: None,
                outcome: TreatmentOutcome::Unknown,
            }
        }

        pub(crate) fn build(&self) -> CaseRecord {
            CaseRecord {
                symptoms: self.symptoms.iter().map(|s| s.to_string()).collect(),
                patient_age: self.age,
                patient_gender: self.gender.map(str::to_string),
                patient_constitution: self.constitution.map(str::to_string),
                formula_name: self.formula.map(str::to_string),
                treatment_outcome: self.outcome,
                ..CaseRecord::new(self.id, self.cc)
            }
        }
    }

    pub(crate) fn service(cases: &[Case<'_>]) -> CaseStatisticsService {
        service_with(cases, CoreConfig::default())
    }

    pub(crate) fn service_with(cases: &[Case<'_>], cfg: CoreConfig) -> CaseStatisticsService {
        let records = cases.iter().map(Case::build).collect();
        CaseStatisticsService::new(Arc::new(CorpusStore::new(records)), Arc::new(cfg))
    }

    /// A small digestive/headache corpus used across the statistics tests.
    pub(crate) fn clinic() -> CaseStatisticsService {
        use TreatmentOutcome::*;
        service(&[
            Case {
                symptoms: &["복통", "피로"],
                age: Some(42),
                gender: Some("female"),
                constitution: Some("소음인"),
                formula: Some("이중탕"),
                outcome: Cured,
                ..Case::new("c1", "소화불량, 복부냉감")
            },
            Case {
                symptoms: &["두통", "어지러움"],
                age: Some(35),
                gender: Some("male"),
                constitution: Some("태음인"),
                formula: Some("갈근탕"),
                outcome: Improved,
                ..Case::new("c2", "긴장성 두통")
            },
            Case {
                symptoms: &["복통", "설사"],
                age: Some(51),
                gender: Some("female"),
                constitution: Some("소음인"),
                formula: Some("이중탕"),
                outcome: NoChange,
                ..Case::new("c3", "소화불량")
            },
            Case {
                symptoms: &["복부팽만", "피로"],
                age: Some(29),
                constitution: Some("소양인"),
                formula: Some("반하사심탕"),
                outcome: Unknown,
                ..Case::new("c4", "식후 더부룩함")
            },
            Case {
                symptoms: &["두통", "오심"],
                age: Some(63),
                gender: Some("female"),
                formula: Some("오수유탕"),
                outcome: Worsened,
                ..Case::new("c5", "편두통")
            },
            Case {
                symptoms: &["불면", "피로"],
                formula: Some("이중탕"),
                outcome: Cured,
                ..Case::new("c6", "소화불량 및 불면")
            },
        ])
    }
}
