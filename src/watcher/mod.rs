//! File watcher behind the `watch-*` operations
//!
//! - Debouncing (100ms by default, `[watch].debounce_ms`)
//! - Content-hash filter against editor save noise
//! - Graceful Ctrl+C shutdown through a shared `running` flag

mod event;
mod rules;
mod session;

pub use event::DEFAULT_DEBOUNCE_MS;
pub use rules::{plan_actions, WatchAction, WatchBatch, WatchRule};
pub use session::{dispatch, rules_for, watch};
