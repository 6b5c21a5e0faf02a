//! Domain models for the episode categorizer.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// EPISODE RECORD
// =============================================================================

/// An episode record as read from the store.
///
/// Only `id`, `categories`, and `updated_at` are interpreted. Every other
/// column is kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Opaque identifier. Stores may hand back UUIDs as strings or serial
    /// keys as numbers; both are normalized to a string.
    #[serde(deserialize_with = "deserialize_opaque_id")]
    pub id: String,
    /// Topical labels, in store order.
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub categories: Vec<String>,
    /// ISO-8601 timestamp of the last modification, as stored.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Columns this service does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl Episode {
    /// Create a bare record with no categories and no timestamp.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            categories: Vec::new(),
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Attach an opaque column.
    pub fn with_field(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Look up an opaque column by name.
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.extra.get(key)
    }

    /// Apply a patch in memory, as the store would.
    pub fn apply(&mut self, patch: &EpisodePatch) {
        self.categories = patch.categories.clone();
        self.updated_at = Some(iso_timestamp(patch.updated_at));
    }
}

fn deserialize_opaque_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "episode id must be a string or number, got {}",
            other
        ))),
    }
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// EPISODE PATCH
// =============================================================================

/// The two columns the handler writes back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodePatch {
    pub categories: Vec<String>,
    #[serde(serialize_with = "serialize_iso_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl EpisodePatch {
    /// Build a patch stamped with the current instant.
    pub fn now(categories: Vec<String>) -> Self {
        Self {
            categories,
            updated_at: Utc::now(),
        }
    }
}

/// Format a timestamp as ISO-8601 UTC with millisecond precision and a `Z`
/// suffix, e.g. `2024-05-01T12:00:00.000Z`.
pub fn iso_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso_timestamp<S>(ts: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&iso_timestamp(*ts))
}

// =============================================================================
// REQUEST / RESPONSE ENVELOPES
// =============================================================================

/// Inbound request body: `{ "episodeId": "..." }`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CategorizeRequest {
    /// Identifier of the episode to categorize.
    #[serde(rename = "episodeId", default)]
    #[schema(value_type = String)]
    pub episode_id: Option<JsonValue>,
}

impl CategorizeRequest {
    /// Parse a raw body and extract a usable episode id.
    ///
    /// An unparsable body, a missing or null id, an empty string, `false`,
    /// or any non-scalar value all fail with the same validation error.
    /// Numeric ids are accepted and rendered as strings.
    pub fn parse_episode_id(body: &[u8]) -> Result<String> {
        let req: CategorizeRequest = serde_json::from_slice(body)
            .map_err(|_| Error::Validation(defaults::EPISODE_ID_REQUIRED.to_string()))?;
        req.episode_id()
    }

    /// Validate the parsed id.
    pub fn episode_id(&self) -> Result<String> {
        match &self.episode_id {
            Some(JsonValue::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(JsonValue::Number(n)) if n.as_f64() != Some(0.0) => Ok(n.to_string()),
            _ => Err(Error::Validation(defaults::EPISODE_ID_REQUIRED.to_string())),
        }
    }
}

/// Success envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorizeSuccess {
    pub success: bool,
    pub message: String,
    pub categories: Vec<String>,
}

impl CategorizeSuccess {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            success: true,
            message: defaults::SUCCESS_MESSAGE.to_string(),
            categories,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorizeFailure {
    pub success: bool,
    pub error: String,
}

impl CategorizeFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl From<&Error> for CategorizeFailure {
    fn from(err: &Error) -> Self {
        Self::new(err.to_string())
    }
}

// =============================================================================
// INVOCATION PHASE
// =============================================================================

/// Lifecycle of a single handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationPhase {
    /// Before the body is parsed.
    Idle,
    /// Validated; fetching, categorizing, or updating.
    Processing,
    /// Terminal; an envelope has been produced.
    Responded,
}

impl InvocationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationPhase::Idle => "idle",
            InvocationPhase::Processing => "processing",
            InvocationPhase::Responded => "responded",
        }
    }
}

impl std::fmt::Display for InvocationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
