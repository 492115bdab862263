//! The in-memory case corpus.
//!
//! A `CorpusStore` is built once at startup from an externally supplied record array and is
//! never mutated afterwards. Reloading means building a new store and swapping the `Arc`
//! held by the service; there is no in-place update. Because nothing mutates it, a store can
//! be shared across threads without locking.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use casematch_types::NonEmptyText;
use casematch_wire::{CaseRecord, Corpus};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, TOP_CORPUS_FORMULAS};
use crate::tally::Tally;
use crate::{EngineError, EngineResult};

/// Immutable, read-only set of historical case records.
#[derive(Debug, Default)]
pub struct CorpusStore {
    records: Vec<CaseRecord>,
    by_id: HashMap<String, usize>,
}

impl CorpusStore {
    /// Build a store from records in their original order.
    ///
    /// If several records share an id, [`CorpusStore::get`] returns the first of them.
    pub fn new(records: Vec<CaseRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            by_id.entry(record.id.clone()).or_insert(i);
        }
        Self { records, by_id }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a store from corpus JSON text.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::CorpusParse` if the document is not an array of objects.
    pub fn from_json(json_text: &str) -> EngineResult<Self> {
        Ok(Self::new(Corpus::parse(json_text)?))
    }

    /// Read and parse a corpus file.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::CorpusRead` if the file cannot be read, or
    /// `EngineError::CorpusParse` if its contents are not a valid corpus.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(EngineError::CorpusRead)?;
        Self::from_json(&text)
    }

    /// Load the configured corpus, degrading to an empty corpus on any failure.
    ///
    /// A failed load is logged as a warning and never stops the process; every statistic
    /// then reports zero counts and `low` confidence.
    pub fn load_or_empty(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::warn!("no corpus configured; starting with an empty corpus");
            return Self::empty();
        };

        match Self::load(path) {
            Ok(store) => {
                tracing::info!(
                    cases = store.len(),
                    path = %path.display(),
                    "loaded case corpus"
                );
                store
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load case corpus; starting with an empty corpus"
                );
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in corpus insertion order.
    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&CaseRecord> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    /// First record whose chief complaint is exactly `chief_complaint`.
    pub fn first_with_chief_complaint(&self, chief_complaint: &str) -> Option<&CaseRecord> {
        self.records
            .iter()
            .find(|r| r.chief_complaint == chief_complaint)
    }

    /// Summary counts for the whole corpus.
    pub fn statistics(&self) -> CorpusStatistics {
        let mut by_constitution = BTreeMap::new();
        for constitution in self.records.iter().filter_map(CaseRecord::constitution) {
            *by_constitution
                .entry(constitution.to_string())
                .or_insert(0usize) += 1;
        }

        let formulas: Tally = self.records.iter().filter_map(CaseRecord::formula).collect();

        CorpusStatistics {
            total_cases: self.len(),
            indexed: !self.is_empty(),
            by_constitution,
            top_formulas: formulas
                .ranked(TOP_CORPUS_FORMULAS)
                .into_iter()
                .map(|(formula, count)| FormulaCount {
                    formula: formula.to_string(),
                    count,
                })
                .collect(),
        }
    }

    /// Page through the corpus with optional text and constitution filters.
    pub fn list_cases(&self, request: &ListCasesRequest) -> CaseListing {
        let page = request.page.unwrap_or(1).max(1);
        let limit = request
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let search = NonEmptyText::from_optional(request.search.as_deref())
            .map(|s| s.as_str().to_lowercase());
        let constitution = NonEmptyText::from_optional(request.constitution.as_deref());

        let matching: Vec<&CaseRecord> = self
            .records
            .iter()
            .filter(|r| match &constitution {
                Some(c) => r.constitution() == Some(c.as_str()),
                None => true,
            })
            .filter(|r| match &search {
                Some(needle) => record_mentions(r, needle),
                None => true,
            })
            .collect();

        let total = matching.len();
        let cases = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();

        CaseListing {
            cases,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }
}

/// Case-insensitive substring search over a record's free-text fields.
fn record_mentions(record: &CaseRecord, needle_lower: &str) -> bool {
    std::iter::once(record.chief_complaint.as_str())
        .chain(record.symptoms.iter().map(String::as_str))
        .chain(record.diagnosis.as_deref())
        .chain(record.formula_name.as_deref())
        .any(|field| field.to_lowercase().contains(needle_lower))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStatistics {
    pub total_cases: usize,
    /// Whether any case is available to search.
    pub indexed: bool,
    pub by_constitution: BTreeMap<String, usize>,
    pub top_formulas: Vec<FormulaCount>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormulaCount {
    pub formula: String,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListCasesRequest {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub constitution: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseListing {
    pub cases: Vec<CaseRecord>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}
