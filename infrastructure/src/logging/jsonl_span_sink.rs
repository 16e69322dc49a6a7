//! JSONL file writer for span events.
//!
//! Each span start and end is serialized as a single JSON line with an
//! `event` field (`span_start` / `span_end`) and a `timestamp`, appended to
//! the file via a buffered writer.

use bridge_application::ports::observability::{ObservabilitySink, SpanEnd, SpanStart};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL span sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlSpanSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlSpanSink {
    /// Create a new sink writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create trace directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create trace file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the trace file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_event(&self, event: &'static str, span: &impl Serialize) {
        let Ok(Value::Object(mut record)) = serde_json::to_value(span) else {
            return;
        };
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        record.insert("event".to_string(), Value::String(event.to_string()));
        record.insert("timestamp".to_string(), Value::String(timestamp));

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl ObservabilitySink for JsonlSpanSink {
    fn span_start(&self, span: &SpanStart) {
        self.write_event("span_start", span);
    }

    fn span_end(&self, span: &SpanEnd) {
        self.write_event("span_end", span);
    }
}

impl Drop for JsonlSpanSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
