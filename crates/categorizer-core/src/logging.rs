//! Structured logging schema and field name constants.
//!
//! The fields below are shared by events in every crate, so log aggregation
//! tools can query the handler, store and categorizer by the same names.
//! Site-specific fields (`rows_affected`, `pool_size`, ...) are not listed.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, request failed with an envelope |
//! | INFO  | Lifecycle events (startup, shutdown), request completions |
//! | DEBUG | Decision points, store calls, config choices |
//! | TRACE | Per-label detail |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "store", "categorizer"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "rest", "postgres", "memory", "handler"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "fetch_one", "update_one", "categorize"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Episode identifier being operated on.
pub const EPISODE_ID: &str = "episode_id";

/// Invocation phase ("idle", "processing", "responded").
pub const PHASE: &str = "phase";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Error kind ("validation", "store", "categorization", "config").
pub const ERROR_KIND: &str = "error_kind";
