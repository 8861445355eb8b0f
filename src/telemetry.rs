//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `kapow_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `endpoint`: remote route (e.g. "task", "images", "images/feedback")
//! - `status`: outcome: "ok", "empty" or "error"
//! - `scope`: invalidation scope: "post" or "all"

/// Total requests sent to the remote API.
///
/// Labels: `endpoint`, `status` ("ok" | "empty" | "error").
pub const REQUESTS_TOTAL: &str = "kapow_requests_total";

/// Remote request duration in seconds.
///
/// Labels: `endpoint`.
pub const REQUEST_DURATION_SECONDS: &str = "kapow_request_duration_seconds";

/// Total result cache hits.
pub const CACHE_HITS_TOTAL: &str = "kapow_cache_hits_total";

/// Total result cache misses.
pub const CACHE_MISSES_TOTAL: &str = "kapow_cache_misses_total";

/// Raw image objects dropped because they could not be decoded.
pub const RECORDS_SKIPPED_TOTAL: &str = "kapow_records_skipped_total";

/// Cache entries removed by explicit invalidation.
///
/// Labels: `scope` ("post" | "all").
pub const INVALIDATIONS_TOTAL: &str = "kapow_invalidations_total";
