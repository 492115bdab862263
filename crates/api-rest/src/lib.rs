//! # API REST
//!
//! REST API for casematch.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, request timeout, `topK` cap)
//!
//! Every endpoint delegates to [`CaseStatisticsService`]; no statistics are computed here.

#![warn(rust_2018_idioms)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query as UrlQuery, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use casematch_core::{
    CaseListing, CaseStatisticsService, ChartData, ComprehensiveStatistics, CorpusStatistics,
    DemographicStatistics, EngineError, FormulaComparison, FormulaStatistics, ListCasesRequest,
    Query, SearchResponse, SimilarCaseStats, SymptomStatistics,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Default upper bound on `options.topK` accepted from a request.
pub const DEFAULT_MAX_TOP_K: usize = 200;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Limits the HTTP layer imposes around the engine, which has no bounds of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestConfig {
    pub max_top_k: usize,
    pub request_timeout: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            max_top_k: DEFAULT_MAX_TOP_K,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Parse `CASEMATCH_MAX_TOP_K`; absent or blank means [`DEFAULT_MAX_TOP_K`].
///
/// # Errors
///
/// Returns an error if the value is not a positive integer.
pub fn max_top_k_from_env_value(value: Option<String>) -> anyhow::Result<usize> {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(DEFAULT_MAX_TOP_K);
    };
    let parsed: usize = raw.trim().parse()?;
    if parsed == 0 {
        anyhow::bail!("CASEMATCH_MAX_TOP_K must be at least 1");
    }
    Ok(parsed)
}

/// Parse `CASEMATCH_REQUEST_TIMEOUT_SECS`; absent or blank means [`DEFAULT_REQUEST_TIMEOUT`].
///
/// # Errors
///
/// Returns an error if the value is not a positive number of seconds.
pub fn request_timeout_from_env_value(value: Option<String>) -> anyhow::Result<Duration> {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(DEFAULT_REQUEST_TIMEOUT);
    };
    let secs: u64 = raw.trim().parse()?;
    if secs == 0 {
        anyhow::bail!("CASEMATCH_REQUEST_TIMEOUT_SECS must be at least 1");
    }
    Ok(Duration::from_secs(secs))
}

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<CaseStatisticsService>,
    max_top_k: usize,
}

impl AppState {
    pub fn new(service: Arc<CaseStatisticsService>, max_top_k: usize) -> Self {
        Self { service, max_top_k }
    }

    /// Run an engine call on the blocking pool so the request timeout can fire while it works.
    async fn run<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(&CaseStatisticsService) -> T + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || call(&service))
            .await
            .map_err(|e| {
                tracing::error!("engine task failed: {:?}", e);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            })
    }

    /// Cap the requested `topK` at the configured maximum.
    fn bounded(&self, mut query: Query) -> Query {
        query.options.top_k = Some(query.options.top_k().min(self.max_top_k));
        query
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    /// Number of cases in the loaded corpus.
    pub cases: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CompareFormulasReq {
    /// Formula names, in the order they should be compared.
    pub formulas: Vec<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCasesParams {
    /// 1-based page number (default 1).
    pub page: Option<usize>,
    /// Page size (default 20, at most 100).
    pub limit: Option<usize>,
    /// Case-insensitive text filter.
    pub search: Option<String>,
    /// Exact constitution filter.
    pub constitution: Option<String>,
}

impl From<ListCasesParams> for ListCasesRequest {
    fn from(params: ListCasesParams) -> Self {
        ListCasesRequest {
            page: params.page,
            limit: params.limit,
            search: params.search,
            constitution: params.constitution,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorRes {
            error: message.into(),
        }),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        search_cases,
        success_stats,
        corpus_statistics,
        list_cases,
        formula_statistics,
        compare_formulas,
        symptom_statistics,
        demographic_statistics,
        comprehensive_statistics,
        chart_data,
    ),
    components(schemas(HealthRes, ErrorRes, CompareFormulasReq))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI, permissive CORS and a request timeout.
pub fn router(service: Arc<CaseStatisticsService>, cfg: RestConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cases", get(list_cases))
        .route("/cases/search", post(search_cases))
        .route("/cases/success-stats", post(success_stats))
        .route("/cases/statistics", get(corpus_statistics))
        .route("/formulas/compare", post(compare_formulas))
        .route("/formulas/:name/statistics", get(formula_statistics))
        .route("/symptoms/:name/statistics", get(symptom_statistics))
        .route("/statistics/demographics", get(demographic_statistics))
        .route("/statistics/comprehensive", get(comprehensive_statistics))
        .route("/charts/:chart_type", get(chart_data))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::new(cfg.request_timeout))
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(service, cfg.max_top_k))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Reports liveness and the size of the loaded corpus. An empty corpus is still healthy:
/// statistics degrade to zero counts rather than failing.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "casematch REST API is alive".into(),
        cases: state.service.corpus().len(),
    })
}

#[utoipa::path(
    post,
    path = "/cases/search",
    responses(
        (status = 200, description = "Ranked, explained matches for the query"),
        (status = 400, description = "Malformed query JSON"),
        (status = 408, description = "Request timed out")
    )
)]
/// Search the corpus for cases similar to the posted query.
#[axum::debug_handler]
async fn search_cases(
    State(state): State<AppState>,
    Json(query): Json<Query>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = state.bounded(query);
    state.run(move |svc| svc.search(&query)).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/cases/success-stats",
    responses(
        (status = 200, description = "Outcome statistics over similar cases")
    )
)]
#[axum::debug_handler]
async fn success_stats(
    State(state): State<AppState>,
    Json(query): Json<Query>,
) -> Result<Json<SimilarCaseStats>, ApiError> {
    state
        .run(move |svc| svc.similar_case_success_stats(&query))
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/cases/statistics",
    responses(
        (status = 200, description = "Corpus summary counts")
    )
)]
#[axum::debug_handler]
async fn corpus_statistics(
    State(state): State<AppState>,
) -> Result<Json<CorpusStatistics>, ApiError> {
    state.run(|svc| svc.statistics()).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/cases",
    params(ListCasesParams),
    responses(
        (status = 200, description = "One page of cases")
    )
)]
/// Page through the corpus with optional filters.
#[axum::debug_handler]
async fn list_cases(
    State(state): State<AppState>,
    UrlQuery(params): UrlQuery<ListCasesParams>,
) -> Result<Json<CaseListing>, ApiError> {
    let request: ListCasesRequest = params.into();
    state.run(move |svc| svc.list_cases(&request)).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/formulas/{name}/statistics",
    params(("name" = String, Path, description = "Formula name or hanja")),
    responses(
        (status = 200, description = "Statistics for the formula"),
        (status = 404, description = "No case uses the formula", body = ErrorRes)
    )
)]
/// Statistics for every case prescribed the named formula.
///
/// # Errors
/// Returns `404 Not Found` when the name is blank or no case uses the formula.
#[axum::debug_handler]
async fn formula_statistics(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FormulaStatistics>, ApiError> {
    let lookup = name.clone();
    state
        .run(move |svc| svc.formula_statistics(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("formula not found: {name}")))
}

#[utoipa::path(
    post,
    path = "/formulas/compare",
    request_body = CompareFormulasReq,
    responses(
        (status = 200, description = "Side-by-side comparison with a recommendation")
    )
)]
#[axum::debug_handler]
async fn compare_formulas(
    State(state): State<AppState>,
    Json(req): Json<CompareFormulasReq>,
) -> Result<Json<FormulaComparison>, ApiError> {
    state
        .run(move |svc| svc.compare_formulas(&req.formulas))
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/symptoms/{name}/statistics",
    params(("name" = String, Path, description = "Symptom name")),
    responses(
        (status = 200, description = "Statistics over cases matching the symptom")
    )
)]
#[axum::debug_handler]
async fn symptom_statistics(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SymptomStatistics>, ApiError> {
    state
        .run(move |svc| svc.symptom_statistics(&name))
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/statistics/demographics",
    responses(
        (status = 200, description = "Demographic breakdowns, with their basis")
    )
)]
#[axum::debug_handler]
async fn demographic_statistics(
    State(state): State<AppState>,
) -> Result<Json<DemographicStatistics>, ApiError> {
    state.run(|svc| svc.demographic_statistics()).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/statistics/comprehensive",
    responses(
        (status = 200, description = "Corpus-wide rollup")
    )
)]
#[axum::debug_handler]
async fn comprehensive_statistics(
    State(state): State<AppState>,
) -> Result<Json<ComprehensiveStatistics>, ApiError> {
    state.run(|svc| svc.comprehensive_statistics()).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/charts/{chart_type}",
    params(("chart_type" = String, Path, description = "outcome, formula, symptom, constitution, age, gender, body_heat or body_strength")),
    responses(
        (status = 200, description = "Labels and datasets for the chart"),
        (status = 400, description = "Unknown chart type", body = ErrorRes)
    )
)]
/// Chart-ready data for one chart type.
///
/// # Errors
/// Returns `400 Bad Request` for an unknown chart type.
#[axum::debug_handler]
async fn chart_data(
    State(state): State<AppState>,
    Path(chart_type): Path<String>,
) -> Result<Json<ChartData>, ApiError> {
    match state.run(move |svc| svc.chart_data(&chart_type)).await? {
        Ok(chart) => Ok(Json(chart)),
        Err(e @ EngineError::UnknownChartType(_)) => {
            tracing::debug!(error = %e, "rejected chart request");
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            tracing::error!("Chart data error: {:?}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_top_k_defaults_and_validates() {
        assert_eq!(max_top_k_from_env_value(None).unwrap(), DEFAULT_MAX_TOP_K);
        assert_eq!(max_top_k_from_env_value(Some(" ".into())).unwrap(), DEFAULT_MAX_TOP_K);
        assert_eq!(max_top_k_from_env_value(Some("50".into())).unwrap(), 50);
        assert!(max_top_k_from_env_value(Some("0".into())).is_err());
        assert!(max_top_k_from_env_value(Some("many".into())).is_err());
    }

    #[test]
    fn request_timeout_defaults_and_validates() {
        assert_eq!(
            request_timeout_from_env_value(None).unwrap(),
            DEFAULT_REQUEST_TIMEOUT
        );
        assert_eq!(
            request_timeout_from_env_value(Some("3".into())).unwrap(),
            Duration::from_secs(3)
        );
        assert!(request_timeout_from_env_value(Some("0".into())).is_err());
        assert!(request_timeout_from_env_value(Some("-1".into())).is_err());
    }

    #[test]
    fn bounded_caps_top_k() {
        let service = Arc::new(CaseStatisticsService::new(
            Arc::new(casematch_core::CorpusStore::empty()),
            Arc::new(casematch_core::CoreConfig::default()),
        ));
        let state = AppState::new(service, 5);
        let query = state.bounded(Query::default().with_options(Some(1000), None));
        assert_eq!(query.options.top_k, Some(5));
        let query = state.bounded(Query::default());
        assert_eq!(query.options.top_k, Some(5));
        let query = state.bounded(Query::default().with_options(Some(2), None));
        assert_eq!(query.options.top_k, Some(2));
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/cases",
            "/cases/search",
            "/cases/success-stats",
            "/cases/statistics",
            "/formulas/{name}/statistics",
            "/formulas/compare",
            "/symptoms/{name}/statistics",
            "/statistics/demographics",
            "/statistics/comprehensive",
            "/charts/{chart_type}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
