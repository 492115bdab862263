use std::sync::Arc;

use casematch_core::{
    score, CaseRecord, CaseStatisticsService, CoreConfig, CorpusStore, Grade, OutcomeAggregator,
    OutcomeResolution, PatientInfo, Query, Ranker, TreatmentOutcome,
};
use proptest::prelude::*;

const TERMS: [&str; 8] = [
    "두통", "복통", "소화불량", "불면", "피로", "편두통", "설사", "어지러움",
];
const CONSTITUTIONS: [&str; 4] = ["태음인", "소양인", "소음인", "태양인"];
const FORMULAS: [&str; 4] = ["이중탕", "갈근탕", "반하사심탕", "오수유탕"];

fn term() -> impl Strategy<Value = String> {
    prop::sample::select(TERMS.to_vec()).prop_map(str::to_string)
}

fn outcome() -> impl Strategy<Value = TreatmentOutcome> {
    prop::sample::select(vec![
        TreatmentOutcome::Cured,
        TreatmentOutcome::Improved,
        TreatmentOutcome::NoChange,
        TreatmentOutcome::Worsened,
        TreatmentOutcome::Unknown,
    ])
}

fn record() -> impl Strategy<Value = CaseRecord> {
    (
        term(),
        prop::collection::vec(term(), 0..4),
        prop::option::of(0u32..100),
        prop::option::of(prop::sample::select(vec!["male", "female"])),
        prop::option::of(prop::sample::select(CONSTITUTIONS.to_vec())),
        prop::option::of(prop::sample::select(FORMULAS.to_vec())),
        outcome(),
    )
        .prop_map(|(cc, symptoms, age, gender, constitution, formula, outcome)| {
            CaseRecord {
                symptoms,
                patient_age: age,
                patient_gender: gender.map(str::to_string),
                patient_constitution: constitution.map(str::to_string),
                formula_name: formula.map(str::to_string),
                treatment_outcome: outcome,
                ..CaseRecord::new("", cc)
            }
        })
}

/// Records with positional ids, so every id resolves.
fn corpus() -> impl Strategy<Value = Vec<CaseRecord>> {
    prop::collection::vec(record(), 0..40).prop_map(|records| {
        records
            .into_iter()
            .enumerate()
            .map(|(i, r)| CaseRecord {
                id: format!("case-{i}"),
                ..r
            })
            .collect()
    })
}

fn query() -> impl Strategy<Value = Query> {
    (
        prop::option::of(term()),
        prop::collection::vec(term(), 0..4),
        prop::option::of(0u32..100),
        prop::option::of(prop::sample::select(vec!["male", "female", " "])),
        prop::option::of(prop::sample::select(CONSTITUTIONS.to_vec())),
    )
        .prop_map(|(cc, symptoms, age, gender, constitution)| {
            Query::new(cc.unwrap_or_default())
                .with_symptoms(symptoms.iter().map(String::as_str))
                .with_patient_info(PatientInfo {
                    age,
                    gender: gender.map(str::to_string),
                    constitution: constitution.map(str::to_string),
                })
        })
}

fn service(records: Vec<CaseRecord>) -> CaseStatisticsService {
    CaseStatisticsService::new(
        Arc::new(CorpusStore::new(records)),
        Arc::new(CoreConfig::default()),
    )
}

proptest! {
    #[test]
    fn score_is_bounded_and_consistent(q in query(), r in record()) {
        let s = score(&q, &r);
        prop_assert!((0.0..=100.0).contains(&s.total));
        prop_assert!((0.0..=60.0).contains(&s.keyword_match));
        prop_assert!((0.0..=40.0).contains(&s.metadata_match));
        prop_assert!((s.total - (s.keyword_match + s.metadata_match).min(100.0)).abs() < 1e-9);
        prop_assert_eq!(s.grade, Grade::for_score(s.total));
    }

    #[test]
    fn grade_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        // S sorts first, so a higher score never gets a later grade.
        prop_assert!(Grade::for_score(hi) <= Grade::for_score(lo));
    }

    #[test]
    fn ranker_output_is_bounded_sorted_and_stable(
        records in corpus(),
        q in query(),
        top_k in 0usize..20,
        min in 0.0f64..100.0,
    ) {
        let store = CorpusStore::new(records);
        let scored = casematch_core::score_corpus(&q, &store);
        let eligible = scored.iter().filter(|c| c.score.total >= min).count();
        let ranked = Ranker::new(min, top_k).rank(scored);

        prop_assert!(ranked.len() <= top_k.min(eligible));
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score.total >= pair[1].score.total);
            if pair[0].score.total == pair[1].score.total {
                let pos = |id: &str| store.records().iter().position(|r| r.id == id);
                prop_assert!(pos(&pair[0].record.id) < pos(&pair[1].record.id));
            }
        }
    }

    #[test]
    fn search_is_idempotent(records in corpus(), q in query()) {
        let svc = service(records);
        let first: Vec<_> = svc.search(&q).results.into_iter().map(|r| (r.case.id, r.match_score)).collect();
        let second: Vec<_> = svc.search(&q).results.into_iter().map(|r| (r.case.id, r.match_score)).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_matched_case_contributes_one_outcome(records in corpus(), q in query()) {
        let store = CorpusStore::new(records);
        let matched = Ranker::new(30.0, 200).rank(casematch_core::score_corpus(&q, &store));
        let summary = OutcomeAggregator::new(&store, OutcomeResolution::Id).aggregate(&matched);

        let d = summary.outcome_distribution;
        prop_assert_eq!(d.cured + d.improved + d.no_change + d.worsened, summary.total_with_outcome);
        prop_assert_eq!(summary.total_with_outcome, matched.len());
        prop_assert!(summary.success_rate.value() <= 100);
        prop_assert!(summary.top_formulas.len() <= 5);
        prop_assert!(summary.top_formulas.iter().all(|f| f.case_count >= 2));
    }

    #[test]
    fn compare_returns_one_entry_per_name(
        records in corpus(),
        names in prop::collection::vec("[가-힣]{1,4}", 0..5),
    ) {
        let svc = service(records);
        let comparison = svc.compare_formulas(&names);
        prop_assert_eq!(comparison.formulas.len(), names.len());
        match comparison.recommendation {
            None => prop_assert!(names.is_empty()),
            Some(rec) => {
                let best = comparison.formulas.iter().map(|e| e.success_rate).max().unwrap();
                let first = comparison.formulas.iter().find(|e| e.success_rate == best).unwrap();
                prop_assert_eq!(rec.formula_name.as_str(), first.formula_name.as_str());
            }
        }
    }
}
