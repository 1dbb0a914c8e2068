//! # Constants
//!
//! Default values for configuration and well-known names.

/// Default port for the metrics and probe server
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Seconds to wait for the HTTP server to bind during startup
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Milliseconds between readiness polls during startup
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Field manager recorded on every write
pub const DEFAULT_FIELD_MANAGER: &str = "replication-definition-controller";

/// Error backoff bounds (seconds)
pub const DEFAULT_ERROR_BACKOFF_MIN_SECS: u64 = 5;
pub const DEFAULT_ERROR_BACKOFF_MAX_SECS: u64 = 300;

/// Requeue delay used when no per-resource backoff is available
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 30;

/// Annotation bumped by `rsdctl reconcile` to force a reconcile
pub const RECONCILE_ANNOTATION: &str = "scribe.backube/reconcile";
