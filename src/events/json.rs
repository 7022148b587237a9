//! JSON Event Sink
//!
//! Outputs events as NDJSON for CI/automation consumption.

use std::io::{self, Write};
use std::sync::Mutex;

use super::{EventSink, TaskEvent};

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Serializes writes from concurrent operations
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl EventSink for JsonEventSink {
    fn on_event(&self, event: TaskEvent) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event.to_json());
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_sink_writes_one_line_per_event() {
        let buf = SharedBuf::default();
        let sink = JsonEventSink::with_writer(buf.clone());

        sink.on_event(TaskEvent::OperationStarted {
            task: "translate-iwm".to_string(),
        });
        sink.on_event(TaskEvent::Reload);

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "{\"event\":\"operation_started\",\"task\":\"translate-iwm\"}"
        );
        assert_eq!(lines[1], "{\"event\":\"reload\"}");
    }
}
