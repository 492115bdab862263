//! Candidate scoring over a corpus, filtering and ordering.

use casematch_wire::CaseRecord;

use crate::corpus::CorpusStore;
use crate::query::{Query, SearchOptions};
use crate::scorer::{MatchScore, MatchScorer};

/// A corpus record together with its score for the current query.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidate<'c> {
    pub record: &'c CaseRecord,
    pub score: MatchScore,
}

/// Score every record of the corpus against `query`, in corpus order.
pub fn score_corpus<'c>(query: &Query, corpus: &'c CorpusStore) -> Vec<ScoredCandidate<'c>> {
    let scorer = MatchScorer::new(query);
    corpus
        .records()
        .iter()
        .map(|record| ScoredCandidate {
            record,
            score: scorer.score(record),
        })
        .collect()
}

/// Filters candidates by minimum score, orders them and keeps the top `top_k`.
///
/// Ordering is by `score.total` descending. The sort is stable, so candidates with equal
/// totals keep their corpus order and the same input always yields the same output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ranker {
    min_confidence: f64,
    top_k: usize,
}

impl Ranker {
    pub fn new(min_confidence: f64, top_k: usize) -> Self {
        Self {
            min_confidence,
            top_k,
        }
    }

    pub fn from_options(options: &SearchOptions) -> Self {
        Self::new(options.min_confidence(), options.top_k())
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn rank<'c>(&self, candidates: Vec<ScoredCandidate<'c>>) -> Vec<ScoredCandidate<'c>> {
        let mut kept: Vec<ScoredCandidate<'c>> = candidates
            .into_iter()
            .filter(|c| c.score.total >= self.min_confidence)
            .collect();
        kept.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
        kept.truncate(self.top_k);
        kept
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::from_options(&SearchOptions::default())
    }
}
