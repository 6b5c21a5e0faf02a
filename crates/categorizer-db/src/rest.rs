//! PostgREST-compatible HTTP episode store.
//!
//! Talks to `{base_url}/rest/v1/episodes` the way a Supabase project exposes
//! its tables. Every request authenticates with the service credential in
//! both the `apikey` and `Authorization: Bearer` headers.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use categorizer_core::defaults;
use categorizer_core::{Episode, EpisodePatch, EpisodeStore, Error, Result};

use crate::not_found;

/// Media type asking PostgREST for exactly one row as a bare object.
/// Zero or multiple matches come back as a 406 error.
pub const SINGLE_OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Configuration for the REST store.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Service-role credential.
    pub service_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// PostgREST implementation of EpisodeStore.
#[derive(Clone)]
pub struct RestEpisodeStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestEpisodeStore {
    /// Build the store and its HTTP client.
    pub fn new(config: RestStoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
        })
    }

    /// Table endpoint, or a store error when no URL is configured.
    fn endpoint(&self) -> Result<String> {
        if self.base_url.is_empty() {
            return Err(Error::Store("Store URL is not configured".to_string()));
        }
        Ok(format!(
            "{}/{}/{}",
            self.base_url,
            defaults::REST_PATH,
            defaults::EPISODES_TABLE
        ))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

/// Turn a non-success response into a store error carrying PostgREST's
/// message when it sent one.
async fn store_error(resp: Response) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let parsed: PostgrestError = serde_json::from_str(&body).unwrap_or_default();

    debug!(
        subsystem = "store",
        component = "rest",
        status = status.as_u16(),
        code = parsed.code.as_deref().unwrap_or(""),
        details = parsed.details.as_deref().unwrap_or(""),
        "Store returned an error"
    );

    match parsed.message {
        Some(message) if !message.is_empty() => Error::Store(message),
        _ if !body.trim().is_empty() => Error::Store(body.trim().to_string()),
        _ => Error::Store(format!(
            "Store request failed: {}",
            status.canonical_reason().unwrap_or(status.as_str())
        )),
    }
}

/// Total row count from a `Content-Range` header such as `*/1` or `0-0/1`.
fn content_range_total(resp: &Response) -> Option<u64> {
    resp.headers()
        .get(header::CONTENT_RANGE)?
        .to_str()
        .ok()?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

#[async_trait]
impl EpisodeStore for RestEpisodeStore {
    async fn fetch_one(&self, id: &str) -> Result<Episode> {
        let start = Instant::now();
        let url = self.endpoint()?;
        let filter = format!("eq.{}", id);

        let resp = self
            .authorize(self.client.get(&url))
            .query(&[("id", filter.as_str()), ("select", "*")])
            .header(header::ACCEPT, SINGLE_OBJECT_MEDIA_TYPE)
            .send()
            .await?;

        debug!(
            subsystem = "store",
            component = "rest",
            op = "fetch_one",
            episode_id = %id,
            status = resp.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched episode"
        );

        if !resp.status().is_success() {
            return Err(store_error(resp).await);
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::Store(format!("Failed to decode episode {}: {}", id, e)))
    }

    async fn update_one(&self, id: &str, patch: &EpisodePatch) -> Result<()> {
        let start = Instant::now();
        let url = self.endpoint()?;
        let filter = format!("eq.{}", id);

        let resp = self
            .authorize(self.client.patch(&url))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal,count=exact")
            .json(patch)
            .send()
            .await?;

        let status = resp.status();
        let total = content_range_total(&resp);

        debug!(
            subsystem = "store",
            component = "rest",
            op = "update_one",
            episode_id = %id,
            status = status.as_u16(),
            rows_affected = ?total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Updated episode categories"
        );

        if !status.is_success() {
            return Err(store_error(resp).await);
        }
        // Servers that omit Content-Range are trusted; only an explicit zero
        // count means the row vanished between fetch and update.
        if total == Some(0) {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "rest"
    }
}
