//! Port for span-based observability.
//!
//! Defines the [`ObservabilitySink`] trait that receives the start and end of
//! every traced unit of work in the dispatch loop: the whole response, each
//! model call and each tool call.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures structured
//! spans that an exporter can ship elsewhere (e.g., a JSONL trace file).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Kind of traced operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// One `respond` call, from user input to final answer
    Respond,
    /// One request to the model
    ModelCall,
    /// One tool execution
    ToolCall,
}

impl SpanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Respond => "respond",
            SpanKind::ModelCall => "model_call",
            SpanKind::ToolCall => "tool_call",
        }
    }
}

/// Outcome recorded when a span ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "message", rename_all = "snake_case")]
pub enum SpanStatus {
    Ok,
    Error(String),
}

impl SpanStatus {
    pub fn error(message: impl Into<String>) -> Self {
        SpanStatus::Error(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, SpanStatus::Ok)
    }
}

/// A span has started.
#[derive(Debug, Clone, Serialize)]
pub struct SpanStart {
    pub span_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    pub kind: SpanKind,
    /// Agent name, model id or tool name depending on the kind
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub attributes: Value,
}

/// A span has ended.
#[derive(Debug, Clone, Serialize)]
pub struct SpanEnd {
    pub span_id: u64,
    pub kind: SpanKind,
    pub name: String,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: SpanStatus,
    pub attributes: Value,
}

/// Port for recording spans.
///
/// Both methods are synchronous and non-fallible: the sink is fire-and-forget
/// and a failing exporter must never disturb a response. Implementations are
/// shared across concurrent responses.
pub trait ObservabilitySink: Send + Sync {
    /// Record that a span started.
    fn span_start(&self, span: &SpanStart);

    /// Record that a span ended.
    fn span_end(&self, span: &SpanEnd);
}

/// No-op implementation for tests and when tracing is disabled.
pub struct NoObservability;

impl ObservabilitySink for NoObservability {
    fn span_start(&self, _span: &SpanStart) {}
    fn span_end(&self, _span: &SpanEnd) {}
}
