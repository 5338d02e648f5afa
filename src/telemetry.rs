//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` — provider name (e.g. "huggingface", "onnx")
//! - `operation` — classifier invoked ("sentiment" | "topic")
//! - `status` — outcome: "ok" or an error bucket

/// Total comments analyzed.
///
/// Labels: `status` ("ok" | "invalid_input" | "value" | "processing" | "unexpected").
pub const ANALYSES_TOTAL: &str = "huginn_analyses_total";

/// Time spent analyzing one comment, in seconds.
pub const ANALYSIS_DURATION_SECONDS: &str = "huginn_analysis_duration_seconds";

/// Total calls into a classification provider.
///
/// Labels: `provider`, `operation`, `status` ("ok" | "error").
pub const CLASSIFIER_REQUESTS_TOTAL: &str = "huginn_classifier_requests_total";

/// Classifier call duration in seconds.
///
/// Labels: `provider`, `operation`.
pub const CLASSIFIER_DURATION_SECONDS: &str = "huginn_classifier_duration_seconds";

/// Topics that cleared the confidence threshold.
///
/// Labels: `topic`.
pub const TOPIC_MATCHES_TOTAL: &str = "huginn_topic_matches_total";

/// Record one provider call.
pub(crate) fn record_classifier_call(
    provider: &str,
    operation: &'static str,
    ok: bool,
    elapsed: std::time::Duration,
) {
    metrics::counter!(CLASSIFIER_REQUESTS_TOTAL,
        "provider" => provider.to_string(),
        "operation" => operation,
        "status" => if ok { "ok" } else { "error" },
    )
    .increment(1);
    metrics::histogram!(CLASSIFIER_DURATION_SECONDS,
        "provider" => provider.to_string(),
        "operation" => operation,
    )
    .record(elapsed.as_secs_f64());
}
