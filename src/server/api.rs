//! JSON API handlers over the loaded dataset. Each request is an independent
//! read-only computation; nothing here mutates shared state.

use std::fmt;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::data::dataset::Dataset;
use crate::data::series::{pivot_series, YearEntry};
use crate::server::events::ConnectionRegistry;

pub const MISSING_PARAMETERS_MESSAGE: &str = "Missing parameters: company or metric";

/// Shared handler state: the immutable dataset plus the event-channel
/// connection registry.
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub events: ConnectionRegistry,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    MissingParameters,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameters => write!(f, "{MISSING_PARAMETERS_MESSAGE}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingParameters => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": MISSING_PARAMETERS_MESSAGE })),
            )
                .into_response(),
        }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "findash-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/companies: distinct company names in first-occurrence order.
pub async fn companies(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dataset.companies().to_vec())
}

/// GET /api/metrics: distinct metric names; the dashboard builds its metric
/// buttons from this instead of hardcoding them.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dataset.metrics().to_vec())
}

/// GET /api/data?company=<s>&metric=<s>&metric=<s>...: the pivoted series.
/// No match is `[]`, not an error; a missing parameter is a 400.
pub async fn data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<YearEntry>>, ApiError> {
    let request = parse_series_params(&params)?;
    Ok(Json(pivot_series(
        state.dataset.records(),
        &request.company,
        &request.metrics,
    )))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesParams {
    pub company: String,
    pub metrics: Vec<String>,
}

/// Pull `company` and the repeated `metric` keys out of the raw query pairs.
/// Empty values count as absent, matching the truthiness check the original
/// dashboard clients rely on.
pub fn parse_series_params(params: &[(String, String)]) -> Result<SeriesParams, ApiError> {
    let company = params
        .iter()
        .find(|(key, value)| key == "company" && !value.is_empty())
        .map(|(_, value)| value.clone());
    let metrics: Vec<String> = params
        .iter()
        .filter(|(key, value)| key == "metric" && !value.is_empty())
        .map(|(_, value)| value.clone())
        .collect();

    match company {
        Some(company) if !metrics.is_empty() => Ok(SeriesParams { company, metrics }),
        _ => Err(ApiError::MissingParameters),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub source_path: String,
    pub record_count: usize,
    pub company_count: usize,
    pub metric_count: usize,
    pub year_min: Option<u16>,
    pub year_max: Option<u16>,
    pub loaded_at: String,
}

/// GET /api/dataset/info: provenance summary of the loaded table.
pub async fn dataset_info(State(state): State<Arc<AppState>>) -> Json<DatasetInfo> {
    let dataset = &state.dataset;
    let span = dataset.year_span();
    Json(DatasetInfo {
        source_path: dataset.source_path().to_string(),
        record_count: dataset.records().len(),
        company_count: dataset.companies().len(),
        metric_count: dataset.metrics().len(),
        year_min: span.map(|(min, _)| min),
        year_max: span.map(|(_, max)| max),
        loaded_at: dataset.loaded_at().to_rfc3339(),
    })
}
