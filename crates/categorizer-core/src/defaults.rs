//! Centralized default constants for the episode categorizer.
//!
//! **This module is the single source of truth** for shared default values
//! and user-visible strings. Crates reference these constants instead of
//! defining their own literals.

// =============================================================================
// STORE
// =============================================================================

/// Table holding episode records.
pub const EPISODES_TABLE: &str = "episodes";

/// Path prefix of the PostgREST API under a Supabase-style project URL.
pub const REST_PATH: &str = "rest/v1";

/// Store client request timeout in seconds.
pub const STORE_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// CATEGORIZATION
// =============================================================================

/// Labels assigned by the fixed categorizer.
pub const CATEGORY_LABELS: &[&str] = &["Technology", "Education"];

// =============================================================================
// HTTP
// =============================================================================

/// Default bind host.
pub const HOST: &str = "0.0.0.0";

/// Default bind port.
pub const PORT: u16 = 3000;

/// Maximum accepted request body size (1 MiB).
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// `Access-Control-Allow-Origin` value.
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// `Access-Control-Allow-Headers` value.
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Body returned for a CORS preflight.
pub const PREFLIGHT_BODY: &str = "ok";

// =============================================================================
// MESSAGES
// =============================================================================

/// Validation failure when the request carries no usable episode id.
pub const EPISODE_ID_REQUIRED: &str = "Episode ID is required";

/// Confirmation message in the success envelope.
pub const SUCCESS_MESSAGE: &str = "Episode categorized successfully";
