//! Shared utilities for use cases.
//!
//! Contains cancellation checking, span recording and log previews used by
//! the dispatch loop.

use crate::ports::observability::{ObservabilitySink, SpanEnd, SpanKind, SpanStart, SpanStatus};
use crate::use_cases::dispatch::RespondError;
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), RespondError> {
    if token.is_cancelled() {
        return Err(RespondError::Cancelled);
    }
    Ok(())
}

/// Shorten a string for log output, respecting char boundaries.
pub(crate) fn preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Hands out span ids and reports span boundaries to an [`ObservabilitySink`].
pub(crate) struct SpanRecorder<'a> {
    sink: &'a dyn ObservabilitySink,
    ids: &'a AtomicU64,
}

impl<'a> SpanRecorder<'a> {
    pub(crate) fn new(sink: &'a dyn ObservabilitySink, ids: &'a AtomicU64) -> Self {
        Self { sink, ids }
    }

    pub(crate) fn start(
        &self,
        kind: SpanKind,
        name: impl Into<String>,
        parent_id: Option<u64>,
        attributes: Value,
    ) -> ActiveSpan<'a> {
        let span_id = self.ids.fetch_add(1, Ordering::Relaxed) + 1;
        let name = name.into();
        self.sink.span_start(&SpanStart {
            span_id,
            parent_id,
            kind,
            name: name.clone(),
            started_at: Utc::now(),
            attributes,
        });
        ActiveSpan {
            sink: self.sink,
            span_id,
            kind,
            name,
            started: Instant::now(),
            finished: false,
        }
    }
}

/// A span that has been started. Dropping it unfinished reports it as cancelled.
pub(crate) struct ActiveSpan<'a> {
    sink: &'a dyn ObservabilitySink,
    span_id: u64,
    kind: SpanKind,
    name: String,
    started: Instant,
    finished: bool,
}

impl ActiveSpan<'_> {
    pub(crate) fn id(&self) -> u64 {
        self.span_id
    }

    pub(crate) fn finish(mut self, status: SpanStatus, attributes: Value) {
        self.emit(status, attributes);
    }

    fn emit(&mut self, status: SpanStatus, attributes: Value) {
        self.finished = true;
        self.sink.span_end(&SpanEnd {
            span_id: self.span_id,
            kind: self.kind,
            name: self.name.clone(),
            ended_at: Utc::now(),
            duration_ms: self.started.elapsed().as_millis() as u64,
            status,
            attributes,
        });
    }
}

impl Drop for ActiveSpan<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.emit(SpanStatus::error("cancelled"), Value::Null);
        }
    }
}
