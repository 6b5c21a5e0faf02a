//! End-to-end tests for the categorize endpoint.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` against
//! an in-memory store, so every assertion about store traffic is exact.
//!
//! Covers:
//! - Preflight answers without store access
//! - Validation failures never reach the store
//! - Store failures on fetch and update map to the failure envelope
//! - Success writes exactly once with the computed labels and a fresh timestamp
//! - Repeated invocations are stable
//! - Categorizer errors and panics still produce an envelope

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use categorizer_api::{build_router, AppState};
use categorizer_core::{Categorizer, Episode, Error, FixedCategorizer, Result};
use categorizer_db::InMemoryEpisodeStore;

// ============================================================================
// HELPERS
// ============================================================================

fn app_with(store: &InMemoryEpisodeStore) -> Router {
    build_router(AppState::new(
        Arc::new(store.clone()),
        Arc::new(FixedCategorizer::default()),
    ))
}

fn app_with_categorizer(store: &InMemoryEpisodeStore, categorizer: impl Categorizer + 'static) -> Router {
    build_router(AppState::new(Arc::new(store.clone()), Arc::new(categorizer)))
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn post_episode(id: &str) -> Request<Body> {
    post(
        "/categorize-episode",
        json!({ "episodeId": id }).to_string(),
    )
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, headers, body)
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let (status, headers, body) = send(app, request).await;
    let json = serde_json::from_slice(&body).expect("response body is JSON");
    (status, headers, json)
}

fn assert_cors(headers: &axum::http::HeaderMap) {
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "authorization, x-client-info, apikey, content-type"
    );
}

struct FailingCategorizer;

#[async_trait]
impl Categorizer for FailingCategorizer {
    async fn categorize(&self, _episode: &Episode) -> Result<Vec<String>> {
        Err(Error::Categorization("model unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

struct PanickingCategorizer;

#[async_trait]
impl Categorizer for PanickingCategorizer {
    async fn categorize(&self, _episode: &Episode) -> Result<Vec<String>> {
        panic!("classifier crashed");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Labels taken from the record's `topic` column.
struct TopicCategorizer;

#[async_trait]
impl Categorizer for TopicCategorizer {
    async fn categorize(&self, episode: &Episode) -> Result<Vec<String>> {
        Ok(episode
            .field("topic")
            .and_then(Value::as_str)
            .map(|t| vec![t.to_string()])
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "topic"
    }
}

// ============================================================================
// PREFLIGHT
// ============================================================================

#[tokio::test]
async fn test_options_returns_ok_without_store_access() {
    let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));

    for uri in ["/categorize-episode", "/", "/any/other/path", "/health"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(app_with(&store), request).await;

        assert_eq!(status, StatusCode::OK, "preflight on {}", uri);
        assert_eq!(body, b"ok");
        assert_cors(&headers);
    }
    assert!(store.calls().is_empty());
}

// ============================================================================
// VALIDATION
// ============================================================================

#[tokio::test]
async fn test_missing_or_empty_episode_id_is_rejected_before_store() {
    let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));

    for body in [
        "{}",
        r#"{"episodeId":""}"#,
        r#"{"episodeId":null}"#,
        r#"{"somethingElse":"ep-1"}"#,
        "not json at all",
        "",
    ] {
        let (status, headers, json) =
            send_json(app_with(&store), post("/categorize-episode", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Episode ID is required");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_cors(&headers);
    }
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_body_is_validation_failure() {
    let store = InMemoryEpisodeStore::new();
    let huge = format!(r#"{{"episodeId":"{}"}}"#, "x".repeat(2 * 1024 * 1024));

    let (status, _, json) = send_json(app_with(&store), post("/categorize-episode", huge)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(store.calls().is_empty());
}

// ============================================================================
// STORE FAILURES
// ============================================================================

#[tokio::test]
async fn test_unknown_episode_reports_not_found() {
    let store = InMemoryEpisodeStore::new();

    let (status, headers, json) = send_json(app_with(&store), post_episode("missing")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "success": false, "error": "Episode not found: missing" })
    );
    assert_cors(&headers);
    assert_eq!(store.fetch_count(), 1);
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn test_duplicate_ids_report_multiple_match() {
    let store = InMemoryEpisodeStore::new()
        .with_episode(Episode::new("dup"))
        .with_episode(Episode::new("dup"));

    let (status, _, json) = send_json(app_with(&store), post_episode("dup")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Multiple episodes match id: dup");
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn test_fetch_transport_failure_is_propagated() {
    let store = InMemoryEpisodeStore::new()
        .with_episode(Episode::new("ep-1"))
        .with_fetch_failure("error sending request: connection refused");

    let (status, _, json) = send_json(app_with(&store), post_episode("ep-1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "error sending request: connection refused");
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn test_update_failure_leaves_categories_unchanged() {
    let mut original = Episode::new("ep-1");
    original.categories = vec!["Comedy".to_string()];
    let store = InMemoryEpisodeStore::new()
        .with_episode(original)
        .with_update_failure("permission denied for table episodes");

    let (status, _, json) = send_json(app_with(&store), post_episode("ep-1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "success": false, "error": "permission denied for table episodes" })
    );
    assert_eq!(store.fetch_count(), 1);
    assert_eq!(store.updates().len(), 1);
    assert_eq!(store.get("ep-1").unwrap().categories, vec!["Comedy"]);
}

// ============================================================================
// SUCCESS
// ============================================================================

#[tokio::test]
async fn test_valid_episode_is_categorized_and_persisted() {
    let store = InMemoryEpisodeStore::new().with_episode(
        Episode::new("ep-1").with_field("title", json!("Async Rust in practice")),
    );
    let start: DateTime<Utc> = Utc::now();

    let (status, headers, json) = send_json(app_with(&store), post_episode("ep-1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "success": true,
            "message": "Episode categorized successfully",
            "categories": ["Technology", "Education"]
        })
    );
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_cors(&headers);

    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    let (id, patch) = &updates[0];
    assert_eq!(id, "ep-1");
    assert_eq!(patch.categories, vec!["Technology", "Education"]);
    assert!(patch.updated_at >= start);

    let stored = store.get("ep-1").unwrap();
    assert_eq!(stored.categories, vec!["Technology", "Education"]);
    assert_eq!(stored.field("title"), Some(&json!("Async Rust in practice")));
}

#[tokio::test]
async fn test_any_path_runs_the_handler() {
    let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));

    let request = post("/functions/v1/categorize-episode", r#"{"episodeId":"ep-1"}"#);
    let (status, _, json) = send_json(app_with(&store), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn test_repeat_invocations_yield_same_categories() {
    let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));

    let (_, _, first) = send_json(app_with(&store), post_episode("ep-1")).await;
    let (_, _, second) = send_json(app_with(&store), post_episode("ep-1")).await;

    assert_eq!(first["categories"], second["categories"]);
    let updates = store.updates();
    assert_eq!(updates.len(), 2);
    assert!(updates[1].1.updated_at >= updates[0].1.updated_at);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));

    let (_, headers, _) = send(app_with(&store), post_episode("ep-1")).await;

    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_content_based_categorizer_can_be_swapped_in() {
    let store = InMemoryEpisodeStore::new()
        .with_episode(Episode::new("ep-1").with_field("topic", json!("Science")));

    let (status, _, json) =
        send_json(app_with_categorizer(&store, TopicCategorizer), post_episode("ep-1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["categories"], json!(["Science"]));
}

#[tokio::test]
async fn test_empty_label_set_is_success() {
    let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));

    let (status, _, json) =
        send_json(app_with_categorizer(&store, TopicCategorizer), post_episode("ep-1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["categories"], json!([]));
    assert_eq!(store.updates().len(), 1);
}

// ============================================================================
// CATEGORIZER FAILURES
// ============================================================================

#[tokio::test]
async fn test_categorizer_error_skips_update() {
    let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));

    let (status, _, json) =
        send_json(app_with_categorizer(&store, FailingCategorizer), post_episode("ep-1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "success": false, "error": "model unavailable" }));
    assert_eq!(store.fetch_count(), 1);
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn test_categorizer_panic_becomes_failure_envelope() {
    let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));

    let (status, headers, json) =
        send_json(app_with_categorizer(&store, PanickingCategorizer), post_episode("ep-1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "classifier crashed");
    assert_cors(&headers);
    assert!(store.updates().is_empty());
}

// ============================================================================
// OPERATIONAL ROUTES
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let store = InMemoryEpisodeStore::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, _, json) = send_json(app_with(&store), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_openapi_document() {
    let store = InMemoryEpisodeStore::new();
    let request = Request::builder()
        .uri("/openapi.json")
        .body(Body::empty())
        .unwrap();

    let (status, _, json) = send_json(app_with(&store), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/categorize-episode"]["post"].is_object());
}
