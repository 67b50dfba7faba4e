//! HTTP surface for the presentation layer.
//!
//! - `GET    /health`
//! - `GET    /archive?page=&limit=&search=&type=&date=`
//! - `POST   /archive/:id/restore`
//! - `DELETE /archive/:id`
//! - `DELETE /archive`
//!
//! `:id` is a composite id such as `customer:64f1c2`.

use crate::core::{ArchiveError, CompositeId, EntityType, ErrorKind};
use crate::filter::{ArchiveFilter, DateBucket};
use crate::model::{AggregatePage, ArchivedRecord, BulkDeleteReport, Outcome};
use crate::service::ArchiveService;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Archive(ArchiveError),
    Input(String),
}

impl From<ArchiveError> for WebError {
    fn from(err: ArchiveError) -> Self {
        WebError::Archive(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Input(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, "input_error"),
            WebError::Archive(err) => {
                let status = status_for(err.kind());
                (status, err.to_string(), code_for(err.kind()))
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationFailure => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Rejected => StatusCode::CONFLICT,
        ErrorKind::SourceUnavailable | ErrorKind::PartialBulkFailure => StatusCode::BAD_GATEWAY,
    }
}

fn code_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::ValidationFailure => "validation_failure",
        ErrorKind::Rejected => "rejected",
        ErrorKind::SourceUnavailable => "source_unavailable",
        ErrorKind::PartialBulkFailure => "partial_bulk_failure",
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub date: Option<String>,
}

impl ListParams {
    fn filter(&self) -> Result<ArchiveFilter> {
        let mut filter = ArchiveFilter::new();
        if let Some(search) = self.search.as_deref() {
            filter = filter.search(search);
        }
        if let Some(entity_type) = non_empty(&self.entity_type) {
            let entity_type = entity_type
                .parse::<EntityType>()
                .map_err(|err| WebError::Input(err.to_string()))?;
            filter = filter.entity_type(entity_type);
        }
        if let Some(date) = non_empty(&self.date) {
            let bucket = date
                .parse::<DateBucket>()
                .map_err(|err| WebError::Input(err.to_string()))?;
            filter = filter.date(bucket);
        }
        Ok(filter)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArchiveListResponse {
    pub records: Vec<ArchivedRecord>,
    /// Records on the loaded page before local filters.
    pub loaded: usize,
    pub page: u32,
    pub limit_per_source: u32,
    pub approx_total_items: u64,
    pub approx_total_pages: u64,
    pub unavailable_sources: Vec<EntityType>,
    pub fetched_at: DateTime<Utc>,
    /// `false` when this request was dropped behind an in-flight fetch.
    pub refreshed: bool,
}

impl ArchiveListResponse {
    fn new(page: AggregatePage, filter: &ArchiveFilter, refreshed: bool) -> Self {
        Self {
            records: filter.apply(&page.records, Utc::now()),
            loaded: page.records.len(),
            page: page.page,
            limit_per_source: page.limit_per_source,
            approx_total_items: page.approx_total_items,
            approx_total_pages: page.approx_total_pages,
            unavailable_sources: page.unavailable_sources,
            fetched_at: page.fetched_at,
            refreshed,
        }
    }
}

pub fn build_router(service: Arc<ArchiveService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/archive", get(list_archive).delete(delete_all))
        .route("/archive/:id", delete(delete_record))
        .route("/archive/:id/restore", post(restore_record))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn list_archive(
    State(service): State<Arc<ArchiveService>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArchiveListResponse>> {
    let filter = params.filter()?;
    let requested_page = params.page.unwrap_or(1);

    let response = match service.fetch(requested_page, params.limit).await {
        Some(page) => ArchiveListResponse::new(page, &filter, true),
        None => {
            let current = service.current_page().await.unwrap_or_else(|| {
                AggregatePage::empty(requested_page, service.config().effective_limit(params.limit))
            });
            ArchiveListResponse::new(current, &filter, false)
        }
    };
    Ok(Json(response))
}

async fn restore_record(
    State(service): State<Arc<ArchiveService>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    Ok(outcome_response(service.restore_by_id(&id).await))
}

async fn delete_record(
    State(service): State<Arc<ArchiveService>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    Ok(outcome_response(service.permanent_delete_by_id(&id).await))
}

async fn delete_all(State(service): State<Arc<ArchiveService>>) -> Response {
    let report: BulkDeleteReport = service.permanent_delete_all().await;
    let status = if !report.any_deleted() && report.is_partial() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    (status, Json(report)).into_response()
}

fn parse_id(raw: &str) -> Result<CompositeId> {
    raw.parse::<CompositeId>()
        .map_err(|err| WebError::Input(err.to_string()))
}

fn outcome_response(outcome: Outcome) -> Response {
    let status = match outcome.error_kind() {
        None => StatusCode::OK,
        Some(kind) => status_for(kind),
    };
    (status, Json(outcome)).into_response()
}
