//! File pipelines behind each operation
//!
//! Every pipeline is built fresh per invocation: match files, transform,
//! write. Each returns the paths it wrote.

pub mod minify;
pub mod package;
pub mod sourcemap;
pub mod sources;
pub mod translate;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::reload::ReloadSink;

/// Shared inputs for pipeline runs
pub struct TaskContext<'a> {
    pub config: &'a Config,
    /// Receives stylesheet updates from the CSS pipeline
    pub reload: &'a dyn ReloadSink,
    /// Fixed clock; `None` means the system clock
    pub clock: Option<DateTime<Utc>>,
}

impl<'a> TaskContext<'a> {
    pub fn new(config: &'a Config, reload: &'a dyn ReloadSink) -> Self {
        Self {
            config,
            reload,
            clock: None,
        }
    }

    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }
}
