//! categorizer-api - HTTP endpoint that assigns topical categories to stored
//! episodes.
//!
//! The router answers the categorize request on `/categorize-episode` and,
//! like a hosted edge function, on every other path too. `/health` and
//! `/openapi.json` are the only routes with their own handlers.

pub mod config;
pub mod cors;
pub mod handler;

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use categorizer_core::defaults;
use categorizer_core::{
    CategorizeFailure, CategorizeRequest, CategorizeSuccess, Categorizer, EpisodeStore,
};

pub use config::Config;
pub use handler::{categorize_episode, CategorizeService};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CategorizeService>,
}

impl AppState {
    pub fn new(store: Arc<dyn EpisodeStore>, categorizer: Arc<dyn Categorizer>) -> Self {
        Self {
            service: Arc::new(CategorizeService::new(store, categorizer)),
        }
    }
}

// =============================================================================
// OPERATIONAL ROUTES
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness probe. Does not touch the store.
#[utoipa::path(get, path = "/health", tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse)))]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Episode Categorizer API",
        description = "Assigns topical categories to stored episode records"
    ),
    paths(handler::categorize_episode, health_check),
    components(schemas(CategorizeRequest, CategorizeSuccess, CategorizeFailure, HealthResponse)),
    tags(
        (name = "Episodes", description = "Episode categorization"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// =============================================================================
// PANIC BOUNDARY
// =============================================================================

/// Render a handler panic as the standard failure envelope.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Internal error".to_string()
    };
    tracing::error!(
        subsystem = "api",
        component = "handler",
        error = %message,
        "Handler panicked"
    );
    handler::failure_message_response(message)
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check).options(cors::preflight))
        .route("/openapi.json", get(openapi_json).options(cors::preflight))
        .route("/categorize-episode", any(categorize_episode))
        .fallback(categorize_episode)
        // Oversized bodies reach the handler as a rejection, not a bare 413.
        .layer(DefaultBodyLimit::max(defaults::BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .with_state(state)
}
