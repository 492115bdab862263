use std::sync::Arc;
use std::time::Duration;

use api_rest::{router, RestConfig};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use casematch_core::{CaseRecord, CaseStatisticsService, CoreConfig, CorpusStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const CORPUS: &str = r#"[
    {"id":"c1","chief_complaint":"소화불량, 복부냉감","symptoms":["복통","피로"],"patient_age":42,
     "patient_gender":"female","patient_constitution":"소음인","formula_name":"이중탕","treatment_outcome":"cured"},
    {"id":"c2","chief_complaint":"긴장성 두통","symptoms":["두통","어지러움"],"patient_age":35,
     "patient_gender":"male","patient_constitution":"태음인","formula_name":"갈근탕","treatment_outcome":"improved"},
    {"id":"c3","chief_complaint":"소화불량","symptoms":["복통","설사"],"patient_age":51,
     "patient_constitution":"소음인","formula_name":"이중탕","treatment_outcome":"no_change"}
]"#;

fn app() -> Router {
    let corpus = CorpusStore::from_json(CORPUS).unwrap();
    let service = CaseStatisticsService::new(Arc::new(corpus), Arc::new(CoreConfig::default()));
    router(Arc::new(service), RestConfig::default())
}

fn encode(segment: &str) -> String {
    segment.bytes().map(|b| format!("%{b:02X}")).collect()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_corpus_size() {
    let (status, body) = send(app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["cases"], 3);
}

#[tokio::test]
async fn search_returns_ranked_camel_case_results() {
    let query = json!({
        "chiefComplaint": "소화불량",
        "symptoms": [{"name": "복통"}],
        "options": {"topK": 2}
    });
    let (status, body) = send(app(), Method::POST, "/cases/search", Some(query)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalFound"], 2);
    assert_eq!(body["results"][0]["id"], "c1");
    assert_eq!(body["results"][0]["matchScore"]["total"], 80.0);
    assert_eq!(body["results"][0]["matchScore"]["grade"], "A");
    assert_eq!(body["searchMetadata"]["queryText"], "소화불량 복통");
}

#[tokio::test]
async fn search_treats_nulls_and_mistyped_fields_as_absent() {
    let query = json!({
        "chiefComplaint": "소화불량",
        "symptoms": null,
        "diagnosis": 3,
        "patientInfo": {"age": "51", "gender": null},
        "options": {"topK": "all"}
    });
    let (status, body) = send(app(), Method::POST, "/cases/search", Some(query)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalFound"], 3);
    assert_eq!(body["results"][0]["id"], "c3");
    assert_eq!(body["results"][0]["matchScore"]["total"], 100.0);
    assert_eq!(body["searchMetadata"]["queryText"], "소화불량");

    let query = json!({"chiefComplaint": null, "patientInfo": null, "options": null});
    let (status, body) = send(app(), Method::POST, "/cases/success-stats", Some(query)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["totalSimilarCases"].is_number());
}

#[tokio::test]
async fn slow_search_hits_the_request_timeout() {
    let records = (0..100_000)
        .map(|i| CaseRecord {
            symptoms: vec!["복통".into(), "피로".into(), "설사".into()],
            ..CaseRecord::new(format!("c{i}"), "소화불량, 복부냉감, 식후 더부룩함")
        })
        .collect();
    let service = CaseStatisticsService::new(
        Arc::new(CorpusStore::new(records)),
        Arc::new(CoreConfig::default()),
    );
    let cfg = RestConfig {
        request_timeout: Duration::from_millis(1),
        ..RestConfig::default()
    };
    let query = json!({"chiefComplaint": "소화불량", "symptoms": [{"name": "복통"}]});
    let (status, _) = send(
        router(Arc::new(service), cfg),
        Method::POST,
        "/cases/search",
        Some(query),
    )
    .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn search_rejects_malformed_json() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/cases/search")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn success_stats_aggregate_similar_cases() {
    let query = json!({"chiefComplaint": "소화불량", "symptoms": [{"name": "복통"}]});
    let (status, body) = send(app(), Method::POST, "/cases/success-stats", Some(query)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSimilarCases"], 2);
    assert_eq!(body["successRate"], 50);
    assert_eq!(body["confidenceLevel"], "low");
    assert_eq!(body["outcomeBreakdown"]["noChange"], 1);
}

#[tokio::test]
async fn corpus_statistics_and_listing() {
    let (status, body) = send(app(), Method::GET, "/cases/statistics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCases"], 3);
    assert_eq!(body["indexed"], true);
    assert_eq!(body["byConstitution"]["소음인"], 2);

    let uri = format!("/cases?limit=1&page=2&constitution={}", encode("소음인"));
    let (status, body) = send(app(), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["cases"][0]["id"], "c3");
}

#[tokio::test]
async fn formula_statistics_found_and_missing() {
    let uri = format!("/formulas/{}/statistics", encode("이중탕"));
    let (status, body) = send(app(), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCases"], 2);
    assert_eq!(body["successRate"], 50);

    let uri = format!("/formulas/{}/statistics", encode("존재하지않는처방"));
    let (status, body) = send(app(), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn compare_formulas_includes_missing_names() {
    let req = json!({"formulas": ["이중탕", "없는처방", "갈근탕"]});
    let (status, body) = send(app(), Method::POST, "/formulas/compare", Some(req)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formulas"].as_array().unwrap().len(), 3);
    assert_eq!(body["formulas"][1]["found"], false);
    assert_eq!(body["recommendation"]["formulaName"], "갈근탕");
    assert_eq!(body["chart"]["caseCounts"], json!([2, 0, 1]));
}

#[tokio::test]
async fn symptom_statistics_by_path() {
    let uri = format!("/symptoms/{}/statistics", encode("복통"));
    let (status, body) = send(app(), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symptom"], "복통");
    assert_eq!(body["topFormulas"][0]["formulaName"], "이중탕");
    assert_eq!(body["topFormulas"][0]["searchScoreSuccessRate"], 100);
}

#[tokio::test]
async fn demographic_and_comprehensive_statistics() {
    let (status, body) = send(app(), Method::GET, "/statistics/demographics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["basis"], "illustrative");
    assert_eq!(body["totalCases"], 3);

    let (status, body) = send(app(), Method::GET, "/statistics/comprehensive", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topFormulas"][0]["formula"], "이중탕");
    assert_eq!(body["demographics"]["basis"], "illustrative");
}

#[tokio::test]
async fn chart_known_and_unknown_types() {
    let (status, body) = send(app(), Method::GET, "/charts/outcome", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chartType"], "outcome");
    assert_eq!(body["datasets"][0]["data"], json!([1, 1, 1, 0]));

    let (status, body) = send(app(), Method::GET, "/charts/pie", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown chart type: pie");
}

#[tokio::test]
async fn empty_corpus_still_serves_statistics() {
    let service = CaseStatisticsService::new(
        Arc::new(CorpusStore::empty()),
        Arc::new(CoreConfig::default()),
    );
    let app = router(Arc::new(service), RestConfig::default());
    let (status, body) = send(
        app,
        Method::POST,
        "/cases/success-stats",
        Some(json!({"chiefComplaint": "두통"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSimilarCases"], 0);
    assert_eq!(body["successRate"], 0);
}
