use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use crm_archive::source::ArchiveBackend;
use crm_archive::{
    ArchiveConfig, ArchiveError, ArchiveService, BackendCollector, CompositeId, EntityType,
    ErrorKind, PageRequest, RestArchiveBackend, SourceCollector,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<String>>>,
}

impl Seen {
    fn record(&self, line: String) {
        self.requests.lock().unwrap().push(line);
    }

    fn lines(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn list_customers(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();
    seen.record(format!(
        "GET customers page={} limit={} auth={}",
        query.get("page").map(String::as_str).unwrap_or("-"),
        query.get("limit").map(String::as_str).unwrap_or("-"),
        auth
    ));
    Json(json!({
        "data": [
            {"_id": "c1", "fullName": "Ada Lovelace", "deletedAt": "2024-05-02T10:00:00Z"},
            {"_id": "c2", "fullName": "Grace Hopper", "deletedAt": "2024-05-01T10:00:00Z"}
        ],
        "pagination": {"totalItems": 7, "totalPages": 4}
    }))
}

async fn restore_customer(State(seen): State<Seen>, Path(id): Path<String>) -> Response {
    seen.record(format!("PATCH customers/{}/restore", id));
    match id.as_str() {
        "c1" => Json(json!({"success": true, "data": {"_id": "c1"}})).into_response(),
        "locked" => (StatusCode::UNPROCESSABLE_ENTITY, "record is locked").into_response(),
        _ => (StatusCode::NOT_FOUND, "no such record").into_response(),
    }
}

async fn delete_customer(State(seen): State<Seen>, Path(id): Path<String>) -> Response {
    seen.record(format!("DELETE customers/{}/permanent", id));
    StatusCode::NO_CONTENT.into_response()
}

async fn wipe_customers(State(seen): State<Seen>) -> Json<serde_json::Value> {
    seen.record("DELETE customers/archived".to_string());
    Json(json!({"deletedCount": 3}))
}

async fn refuse_project_restore(Path(_id): Path<String>) -> Json<serde_json::Value> {
    Json(json!({"success": false, "message": "project has active deals"}))
}

async fn restore_todo_as_text(Path(_id): Path<String>) -> &'static str {
    "Restored"
}

async fn delete_todo_as_html(Path(_id): Path<String>) -> Html<&'static str> {
    Html("<html><body>Deleted</body></html>")
}

async fn broken_deals() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "database offline").into_response()
}

async fn everything_else(method: Method) -> Response {
    if method == Method::GET {
        Json(json!({"data": [], "pagination": {"totalItems": 0}})).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn spawn_stub() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route(
            "/api/customers/archived",
            get(list_customers).delete(wipe_customers),
        )
        .route("/api/customers/:id/restore", patch(restore_customer))
        .route("/api/customers/:id/permanent", delete(delete_customer))
        .route("/api/leads/archived", get(everything_else))
        .route("/api/projects/:id/restore", patch(refuse_project_restore))
        .route("/api/deals/archived", get(broken_deals))
        .route("/api/todos/:id/restore", patch(restore_todo_as_text))
        .route("/api/todos/:id/permanent", delete(delete_todo_as_html))
        .fallback(everything_else)
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), seen)
}

#[tokio::test]
async fn lists_archived_page_with_query_and_token() {
    let (base_url, seen) = spawn_stub().await;
    let backend = RestArchiveBackend::new(base_url).unwrap().token("secret");

    let response = backend
        .list_archived(EntityType::Customer, PageRequest::new(2, 25))
        .await
        .unwrap();

    assert_eq!(response.data.len(), 2);
    assert_eq!(response.total_items(), Some(7));
    assert_eq!(
        seen.lines(),
        ["GET customers page=2 limit=25 auth=Bearer secret"]
    );
}

#[tokio::test]
async fn single_record_calls_map_status_codes() {
    let (base_url, seen) = spawn_stub().await;
    let backend = RestArchiveBackend::new(base_url).unwrap();

    let restored = backend.restore(EntityType::Customer, "c1").await.unwrap();
    assert_eq!(restored.success, Some(true));

    let missing = backend.restore(EntityType::Customer, "gone").await;
    assert!(matches!(missing, Err(ArchiveError::NotFound { .. })));

    let locked = backend
        .restore(EntityType::Customer, "locked")
        .await
        .unwrap_err();
    assert_eq!(locked.kind(), ErrorKind::Rejected);
    assert!(locked.to_string().contains("record is locked"));

    // An empty 204 body still counts as acknowledged.
    let deleted = backend
        .permanent_delete(EntityType::Customer, "c2")
        .await
        .unwrap();
    assert_eq!(deleted.success, None);

    assert_eq!(
        seen.lines(),
        [
            "PATCH customers/c1/restore",
            "PATCH customers/gone/restore",
            "PATCH customers/locked/restore",
            "DELETE customers/c2/permanent",
        ]
    );
}

#[tokio::test]
async fn bulk_wipe_treats_missing_route_as_unsupported() {
    let (base_url, _seen) = spawn_stub().await;
    let backend = RestArchiveBackend::new(base_url).unwrap();

    let wiped = backend
        .permanent_delete_all(EntityType::Customer)
        .await
        .unwrap();
    assert_eq!(wiped.map(|response| response.deleted_count), Some(3));

    // GET-only route answers 405, unknown route answers 404.
    assert!(
        backend
            .permanent_delete_all(EntityType::Prospect)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        backend
            .permanent_delete_all(EntityType::TodoItem)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn server_errors_and_unreachable_hosts_mean_unavailable() {
    let (base_url, _seen) = spawn_stub().await;
    let backend = RestArchiveBackend::new(base_url).unwrap();

    let broken = backend
        .list_archived(EntityType::Deal, PageRequest::new(1, 10))
        .await
        .unwrap_err();
    assert!(matches!(broken, ArchiveError::Backend { status: 500, .. }));
    assert_eq!(broken.kind(), ErrorKind::SourceUnavailable);

    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = closed.local_addr().unwrap();
    drop(closed);
    let offline = RestArchiveBackend::new(format!("http://{}", dead_addr)).unwrap();
    let err = offline
        .list_archived(EntityType::Customer, PageRequest::new(1, 10))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
}

#[tokio::test]
async fn service_over_rest_backend_isolates_failing_source() {
    let (base_url, _seen) = spawn_stub().await;
    let backend = RestArchiveBackend::new(base_url).unwrap();
    let service = ArchiveService::from_backend(Arc::new(backend), ArchiveConfig::new()).unwrap();

    let page = service.fetch(1, Some(10)).await.unwrap();
    let ids: Vec<_> = page
        .records
        .iter()
        .map(|record| record.composite_id.to_string())
        .collect();
    assert_eq!(ids, ["customer:c1", "customer:c2"]);
    assert_eq!(page.approx_total_items, 7);
    assert_eq!(page.unavailable_sources, [EntityType::Deal]);

    let restored = service
        .restore_by_id(&CompositeId::new(EntityType::Customer, "c1"))
        .await;
    assert!(restored.ok);
    assert_eq!(service.current_page().await.unwrap().len(), 1);

    let refused = service
        .restore_by_id(&CompositeId::new(EntityType::Project, "p1"))
        .await;
    assert_eq!(refused.error_kind(), Some(ErrorKind::Rejected));
    assert_eq!(
        refused.error.map(|error| error.message),
        Some("project has active deals".to_string())
    );
}

#[tokio::test]
async fn success_status_with_non_json_body_counts_as_applied() {
    let (base_url, _seen) = spawn_stub().await;
    let backend = RestArchiveBackend::new(base_url).unwrap();

    let restored = backend.restore(EntityType::TodoItem, "t1").await.unwrap();
    assert_eq!(restored.success, None);

    let collector = BackendCollector::new(EntityType::TodoItem, Arc::new(backend));
    let outcome = collector.restore("t1").await;
    assert!(outcome.ok, "{:?}", outcome.error);

    let outcome = collector.permanent_delete("t2").await;
    assert!(outcome.ok, "{:?}", outcome.error);
}
