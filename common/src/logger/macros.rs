use tracing::{Level, Span};

use super::TraceId;

/// Create a root span for one booking operation (suggest / commit / sweep)
pub fn request_span(op: &'static str, trace_id: &TraceId) -> Span {
    tracing::span!(
        Level::INFO,
        "booking_request",
        op,
        trace_id = %trace_id.as_str()
    )
}

/// Create a child span for a pipeline stage (inherits trace_id automatically)
pub fn child_span(stage: &'static str) -> Span {
    tracing::span!(Level::INFO, "stage", stage)
}
