//! Span sink that forwards to `tracing`.

use bridge_application::ports::observability::{ObservabilitySink, SpanEnd, SpanStart, SpanStatus};
use tracing::{debug, info, warn};

/// Emits one `tracing` event per span boundary.
///
/// Starts are logged at debug level, successful ends at info and failed ends
/// at warn, so `-v` shows completed work and `-vv` the full timeline.
pub struct TracingSpanSink;

impl ObservabilitySink for TracingSpanSink {
    fn span_start(&self, span: &SpanStart) {
        debug!(
            span_id = span.span_id,
            parent_id = ?span.parent_id,
            kind = span.kind.as_str(),
            name = %span.name,
            "span started"
        );
    }

    fn span_end(&self, span: &SpanEnd) {
        match &span.status {
            SpanStatus::Ok => info!(
                span_id = span.span_id,
                kind = span.kind.as_str(),
                name = %span.name,
                duration_ms = span.duration_ms,
                "span ended"
            ),
            SpanStatus::Error(message) => warn!(
                span_id = span.span_id,
                kind = span.kind.as_str(),
                name = %span.name,
                duration_ms = span.duration_ms,
                error = %message,
                "span failed"
            ),
        }
    }
}
