//! Progress events emitted by the runner, the watcher and the dev server.
//!
//! Nothing prints directly; everything goes through an [`EventSink`] so the
//! CLI can choose between human output and NDJSON.

mod console;
mod json;
pub mod theme;

use serde::Serialize;

pub use console::ConsoleEventSink;
pub use json::JsonEventSink;

/// Events for console or NDJSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEvent {
    RunStarted {
        tasks: Vec<String>,
    },
    OperationStarted {
        task: String,
    },
    FileWritten {
        task: String,
        path: String,
    },
    OperationFinished {
        task: String,
        files: usize,
        duration_ms: u64,
    },
    OperationFailed {
        task: String,
        error: String,
    },
    OperationSkipped {
        task: String,
        reason: String,
    },
    RunFinished {
        succeeded: usize,
        failed: usize,
        skipped: usize,
    },
    WatchStarted {
        task: String,
        paths: Vec<String>,
    },
    FileChanged {
        path: String,
    },
    Reload,
    CssInjected {
        path: String,
    },
    ServerListening {
        url: String,
        proxy: String,
    },
    Error {
        message: String,
    },
    Shutdown,
}

impl TaskEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Receives progress events. Shared across operation threads.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: TaskEvent);
}
