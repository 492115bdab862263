//! Human-readable reasons for a match.
//!
//! Reasons are display-only. Their contributions are indicative weights for the UI and are
//! never added back into [`crate::MatchScore`].

use casematch_wire::CaseRecord;
use serde::Serialize;

use crate::constants::{
    CHIEF_COMPLAINT_CONTRIBUTION, CHIEF_COMPLAINT_PREFIX_CHARS, CONSTITUTION_CONTRIBUTION,
    SYMPTOM_CONTRIBUTION,
};
use crate::query::Query;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    ChiefComplaint,
    Symptom,
    Constitution,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchReason {
    #[serde(rename = "type")]
    pub kind: ReasonKind,
    pub description: String,
    pub contribution: u32,
}

/// Explain why `record` matched `query`.
///
/// Reasons come out in a fixed order: chief complaint, symptoms, constitution.
pub fn explain(query: &Query, record: &CaseRecord) -> Vec<MatchReason> {
    let mut reasons = Vec::new();

    let prefix: String = record
        .chief_complaint
        .trim()
        .chars()
        .take(CHIEF_COMPLAINT_PREFIX_CHARS)
        .collect::<String>()
        .to_lowercase();
    if !prefix.is_empty() && query.chief_complaint.to_lowercase().contains(&prefix) {
        reasons.push(MatchReason {
            kind: ReasonKind::ChiefComplaint,
            description: format!("주소증 유사: {}", record.chief_complaint.trim()),
            contribution: CHIEF_COMPLAINT_CONTRIBUTION,
        });
    }

    let case_symptoms: Vec<String> = record
        .symptoms
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let matched: Vec<&str> = query
        .symptom_names()
        .filter(|name| {
            let name = name.to_lowercase();
            case_symptoms
                .iter()
                .any(|s| s.contains(&name) || name.contains(s.as_str()))
        })
        .collect();
    if !matched.is_empty() {
        reasons.push(MatchReason {
            kind: ReasonKind::Symptom,
            description: format!("증상 일치: {}", matched.join(", ")),
            contribution: matched.len() as u32 * SYMPTOM_CONTRIBUTION,
        });
    }

    if let (Some(wanted), Some(actual)) = (query.patient_info.constitution(), record.constitution())
    {
        if wanted.as_str() == actual.trim() {
            reasons.push(MatchReason {
                kind: ReasonKind::Constitution,
                description: format!("체질 일치: {}", wanted),
                contribution: CONSTITUTION_CONTRIBUTION,
            });
        }
    }

    reasons
}
