//! # casematch core
//!
//! Similarity search and outcome statistics over a corpus of historical clinical cases.
//!
//! This crate contains pure, synchronous computation over an immutable in-memory corpus:
//! - Scoring a query against every case (keyword overlap plus demographic agreement)
//! - Grading, ranking and explaining matches
//! - Aggregating treatment outcomes of a matched set
//! - Per-formula, per-symptom, demographic and chart-ready statistics
//!
//! **No API concerns**: HTTP servers and command-line handling belong in `api-rest` and
//! `casematch-cli`.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod error;
pub mod explain;
pub mod grade;
pub mod outcome;
pub mod query;
pub mod ranker;
pub mod scorer;
pub mod statistics;

mod tally;

pub use config::{CoreConfig, DemographicsBasis, OutcomeResolution};
pub use corpus::{CaseListing, CorpusStatistics, CorpusStore, FormulaCount, ListCasesRequest};
pub use error::{EngineError, EngineResult};
pub use explain::{explain, MatchReason, ReasonKind};
pub use grade::Grade;
pub use outcome::{
    ConfidenceLevel, FormulaSuccessStat, OutcomeAggregator, OutcomeDistribution, OutcomeSummary,
};
pub use query::{PatientInfo, Query, SearchOptions, SymptomInput};
pub use ranker::{score_corpus, Ranker, ScoredCandidate};
pub use scorer::{score, MatchScore, MatchScorer};
pub use statistics::{
    CaseStatisticsService, ChartData, ChartDataset, ChartType, ComparisonChart,
    ComprehensiveStatistics, DemographicBucket, DemographicStatistics, FormulaComparison,
    FormulaComparisonEntry, FormulaRecommendation, FormulaStatistics, MatchedCase, SearchMetadata,
    SearchResponse, SimilarCaseStats, SymptomCount, SymptomFormulaStat, SymptomStatistics,
};

pub use casematch_types::{NonEmptyText, Percent};
pub use casematch_wire::{CaseRecord, TreatmentOutcome};
