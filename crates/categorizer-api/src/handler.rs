//! The categorize-episode request handler.
//!
//! One invocation runs `parse -> fetch -> categorize -> update -> respond`
//! with exactly one store read and, on success, exactly one store write.
//! Every failure on the way is rendered as the failure envelope with status
//! 400; validation and store failures are deliberately not distinguished
//! by status code.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info, warn};

use categorizer_core::defaults;
use categorizer_core::{
    CategorizeFailure, CategorizeRequest, CategorizeSuccess, Categorizer, EpisodePatch,
    EpisodeStore, Error, InvocationPhase, Result,
};

use crate::cors::{cors_headers, preflight};
use crate::AppState;

/// Orchestrates one categorization against injected collaborators.
pub struct CategorizeService {
    store: Arc<dyn EpisodeStore>,
    categorizer: Arc<dyn Categorizer>,
}

impl CategorizeService {
    pub fn new(store: Arc<dyn EpisodeStore>, categorizer: Arc<dyn Categorizer>) -> Self {
        Self { store, categorizer }
    }

    /// Run the full read-modify-write for a raw request body.
    ///
    /// Fetch and update are not wrapped in a transaction; if the update
    /// fails, nothing is rolled back and nothing was written. Concurrent
    /// invocations for the same id are last-write-wins.
    pub async fn categorize(&self, body: &[u8]) -> Result<Vec<String>> {
        debug!(phase = %InvocationPhase::Idle, "Parsing categorize request");
        let episode_id = CategorizeRequest::parse_episode_id(body)?;

        debug!(
            phase = %InvocationPhase::Processing,
            episode_id = %episode_id,
            backend = self.store.backend(),
            "Fetching episode"
        );
        let episode = self.store.fetch_one(&episode_id).await?;

        let categories = self.categorizer.categorize(&episode).await?;
        debug!(
            episode_id = %episode_id,
            categorizer = self.categorizer.name(),
            category_count = categories.len(),
            "Computed categories"
        );

        let patch = EpisodePatch::now(categories);
        self.store.update_one(&episode_id, &patch).await?;

        Ok(patch.categories)
    }
}

/// Success envelope with status 200 and CORS headers.
pub fn success_response(categories: Vec<String>) -> Response {
    (
        StatusCode::OK,
        cors_headers(),
        Json(CategorizeSuccess::new(categories)),
    )
        .into_response()
}

/// Failure envelope with status 400 and CORS headers.
pub fn failure_response(error: &Error) -> Response {
    failure_message_response(error.to_string())
}

pub(crate) fn failure_message_response(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        cors_headers(),
        Json(CategorizeFailure::new(message)),
    )
        .into_response()
}

/// Categorize an episode.
///
/// `OPTIONS` answers the CORS preflight without touching the store; every
/// other method runs the categorization.
#[utoipa::path(
    post,
    path = "/categorize-episode",
    tag = "Episodes",
    request_body = CategorizeRequest,
    responses(
        (status = 200, description = "Episode categorized", body = CategorizeSuccess),
        (status = 400, description = "Validation or store failure", body = CategorizeFailure),
    )
)]
pub async fn categorize_episode(
    State(state): State<AppState>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return preflight().await;
    }

    let start = Instant::now();
    let outcome = match body {
        Ok(bytes) => state.service.categorize(&bytes).await,
        Err(rejection) => {
            debug!(error = %rejection, "Request body could not be read");
            Err(Error::Validation(defaults::EPISODE_ID_REQUIRED.to_string()))
        }
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(categories) => {
            info!(
                subsystem = "api",
                component = "handler",
                op = "categorize",
                phase = %InvocationPhase::Responded,
                success = true,
                category_count = categories.len(),
                duration_ms,
                "Episode categorized"
            );
            success_response(categories)
        }
        Err(err) => {
            warn!(
                subsystem = "api",
                component = "handler",
                op = "categorize",
                phase = %InvocationPhase::Responded,
                success = false,
                error_kind = err.kind(),
                error = %err,
                duration_ms,
                "Episode categorization failed"
            );
            failure_response(&err)
        }
    }
}
