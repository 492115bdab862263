//! Constants used throughout the casematch core crate.
//!
//! Scoring weights, thresholds and defaults live here so they are named once. Several of them
//! encode product decisions that have not been re-derived; change them only together with the
//! product owner.

/// Maximum points awarded for keyword overlap.
pub const KEYWORD_WEIGHT: f64 = 60.0;

/// Maximum points awarded for demographic (metadata) agreement.
pub const METADATA_WEIGHT: f64 = 40.0;

/// Metadata points awarded when the query supplies no demographic field at all.
pub const NEUTRAL_METADATA_SCORE: f64 = 20.0;

/// Upper bound of a total match score.
pub const MAX_SCORE: f64 = 100.0;

/// Age difference (years) that still counts as a full metadata match.
pub const AGE_CLOSE_YEARS: u32 = 5;

/// Age difference (years) that counts as a half metadata match.
pub const AGE_NEAR_YEARS: u32 = 10;

/// Leading characters of a record's chief complaint compared by the match explainer.
pub const CHIEF_COMPLAINT_PREFIX_CHARS: usize = 5;

/// Explainer contribution for a chief-complaint overlap.
pub const CHIEF_COMPLAINT_CONTRIBUTION: u32 = 30;

/// Explainer contribution per matched symptom.
pub const SYMPTOM_CONTRIBUTION: u32 = 10;

/// Explainer contribution for a constitution match.
pub const CONSTITUTION_CONTRIBUTION: u32 = 15;

/// Default number of results returned by a search.
pub const DEFAULT_TOP_K: usize = 10;

/// Default minimum score for a search result.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.0;

/// Candidate pool used for similar-case success statistics.
pub const SUCCESS_STATS_TOP_K: usize = 200;
pub const SUCCESS_STATS_MIN_CONFIDENCE: f64 = 30.0;

/// Candidate pool used for per-symptom statistics.
pub const SYMPTOM_STATS_TOP_K: usize = 200;
pub const SYMPTOM_STATS_MIN_CONFIDENCE: f64 = 20.0;

/// Search score a symptom-statistics candidate needs to count as a "search-score success".
pub const SEARCH_SCORE_SUCCESS_THRESHOLD: f64 = 60.0;

/// Success rate reported when matched cases exist but none carried a resolvable outcome.
pub const DEFAULT_SUCCESS_RATE: i64 = 85;

/// Matched-set sizes for the `high` and `medium` confidence levels.
pub const HIGH_CONFIDENCE_CASES: usize = 50;
pub const MEDIUM_CONFIDENCE_CASES: usize = 10;

/// A formula needs at least this many matched cases to be reported.
pub const MIN_FORMULA_CASES: usize = 2;

/// Number of formulas reported by the outcome aggregator.
pub const TOP_SUCCESSFUL_FORMULAS: usize = 5;

/// Number of formulas in corpus-wide listings.
pub const TOP_CORPUS_FORMULAS: usize = 10;

/// Number of formulas in per-symptom statistics.
pub const TOP_SYMPTOM_FORMULAS: usize = 5;

/// Number of symptoms in symptom frequency listings.
pub const TOP_SYMPTOMS: usize = 10;

/// Case listing page size bounds.
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Treatment duration labels reported by the outcome aggregator.
pub const DURATION_CURED_DOMINANT: &str = "1–2주";
pub const DURATION_DEFAULT: &str = "2–4주";
pub const DURATION_SLOW_RESPONSE: &str = "4–8주";

/// Label for records whose demographic field is missing or unrecognised.
pub const UNKNOWN_BUCKET: &str = "미상";

/// Illustrative population shares applied to the corpus size when demographics are not
/// observed. They describe a typical clinic population, not this corpus.
pub const ILLUSTRATIVE_AGE_RATIOS: [(&str, f64); 6] = [
    ("20세 미만", 0.05),
    ("20대", 0.15),
    ("30대", 0.20),
    ("40대", 0.25),
    ("50대", 0.20),
    ("60세 이상", 0.15),
];
pub const ILLUSTRATIVE_GENDER_RATIOS: [(&str, f64); 2] = [("남성", 0.42), ("여성", 0.58)];
pub const ILLUSTRATIVE_CONSTITUTION_RATIOS: [(&str, f64); 4] = [
    ("태음인", 0.40),
    ("소양인", 0.30),
    ("소음인", 0.28),
    ("태양인", 0.02),
];
pub const ILLUSTRATIVE_BODY_HEAT_RATIOS: [(&str, f64); 3] =
    [("한(寒)", 0.40), ("열(熱)", 0.35), ("평(平)", 0.25)];
pub const ILLUSTRATIVE_BODY_STRENGTH_RATIOS: [(&str, f64); 3] =
    [("허(虛)", 0.55), ("실(實)", 0.30), ("평(平)", 0.15)];
