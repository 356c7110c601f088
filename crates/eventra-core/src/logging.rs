//! Structured logging field name constants for eventra.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated through a request. Format: UUIDv7.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "assist"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "quotes", "events", "pool", "gemini", "planner"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "transition", "recommend_venues"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// User UUID acting or acted upon.
pub const USER_ID: &str = "user_id";

/// Event UUID being operated on.
pub const EVENT_ID: &str = "event_id";

/// Venue UUID being operated on.
pub const VENUE_ID: &str = "venue_id";

/// Quote UUID being operated on.
pub const QUOTE_ID: &str = "quote_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a listing or search.
pub const RESULT_COUNT: &str = "result_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Assist fields ─────────────────────────────────────────────────────────

/// Assist backend identifier ("gemini", "mock").
pub const BACKEND: &str = "backend";

/// Whether the deterministic fallback path produced the result.
pub const FALLBACK: &str = "fallback";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
