//! Live-reload signalling
//!
//! Pipelines and the watcher push [`ReloadSignal`]s into a [`ReloadSink`].
//! The [`ReloadHub`] fans them out to every connected browser through a
//! broadcast channel that the dev server subscribes to.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::events::{EventSink, TaskEvent};

/// Capacity of the broadcast channel; slow browsers skip old signals.
const CHANNEL_CAPACITY: usize = 64;

/// What connected browsers should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadSignal {
    /// Full page reload
    Reload,
    /// Swap one stylesheet without reloading (file name, e.g. `style.min.css`)
    InjectCss { file: String },
}

impl ReloadSignal {
    /// SSE event name
    pub fn event_name(&self) -> &'static str {
        match self {
            ReloadSignal::Reload => "reload",
            ReloadSignal::InjectCss { .. } => "css",
        }
    }

    /// SSE payload; never empty, browsers drop data-less events
    pub fn data(&self) -> &str {
        match self {
            ReloadSignal::Reload => "reload",
            ReloadSignal::InjectCss { file } => file,
        }
    }
}

/// Receives reload signals
pub trait ReloadSink: Send + Sync {
    fn send(&self, signal: ReloadSignal);
}

/// Sink used when no dev server runs
pub struct NoopReload;

impl ReloadSink for NoopReload {
    fn send(&self, _signal: ReloadSignal) {}
}

/// Broadcast hub between pipelines/watcher and the dev server.
#[derive(Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadSignal>,
    inject_css: bool,
    events: Option<Arc<dyn EventSink>>,
}

impl ReloadHub {
    /// With `inject_css = false` every stylesheet update becomes a full reload.
    pub fn new(inject_css: bool) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            inject_css,
            events: None,
        }
    }

    /// Report every delivered signal to an event sink
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadSignal> {
        self.sender.subscribe()
    }

    /// Number of connected browsers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ReloadSink for ReloadHub {
    fn send(&self, signal: ReloadSignal) {
        let signal = match signal {
            ReloadSignal::InjectCss { .. } if !self.inject_css => ReloadSignal::Reload,
            other => other,
        };

        if let Some(events) = &self.events {
            events.on_event(match &signal {
                ReloadSignal::Reload => TaskEvent::Reload,
                ReloadSignal::InjectCss { file } => TaskEvent::CssInjected { path: file.clone() },
            });
        }

        // No receivers is fine: nobody has the page open yet.
        let _ = self.sender.send(signal);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records signals for assertions
    #[derive(Default)]
    pub(crate) struct RecordingReload {
        pub(crate) signals: Mutex<Vec<ReloadSignal>>,
    }

    impl RecordingReload {
        pub(crate) fn snapshot(&self) -> Vec<ReloadSignal> {
            self.signals.lock().unwrap().clone()
        }
    }

    impl ReloadSink for RecordingReload {
        fn send(&self, signal: ReloadSignal) {
            self.signals.lock().unwrap().push(signal);
        }
    }
}
