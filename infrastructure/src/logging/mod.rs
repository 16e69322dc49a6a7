//! Logging infrastructure: span sinks.
//!
//! Provides two [`ObservabilitySink`](bridge_application::ObservabilitySink)
//! adapters:
//!
//! - [`JsonlSpanSink`]: one JSON line per span event, written to a file
//! - [`TracingSpanSink`]: forwards span events to `tracing`

mod jsonl_span_sink;
mod tracing_sink;

pub use jsonl_span_sink::JsonlSpanSink;
pub use tracing_sink::TracingSpanSink;
