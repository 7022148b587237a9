//! Debounce and change-detection state for the watch loop

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Debounce duration used when the config does not set one
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Watcher state for debouncing
pub(crate) struct WatcherState {
    pub(crate) pending_changes: HashSet<PathBuf>,
    pub(crate) last_change: Option<Instant>,
    debounce: Duration,
}

impl WatcherState {
    pub(crate) fn new(debounce: Duration) -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
            debounce,
        }
    }

    pub(crate) fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    pub(crate) fn should_sync(&self) -> bool {
        if let Some(last) = self.last_change {
            !self.pending_changes.is_empty() && last.elapsed() >= self.debounce
        } else {
            false
        }
    }

    /// Drain pending paths, sorted
    pub(crate) fn take_changes(&mut self) -> Vec<PathBuf> {
        let mut changes: Vec<_> = self.pending_changes.drain().collect();
        changes.sort();
        self.last_change = None;
        changes
    }
}

/// Last seen content hash per path; filters editor save noise.
#[derive(Debug, Default)]
pub(crate) struct ContentTracker {
    hashes: HashMap<PathBuf, String>,
}

impl ContentTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `hash` for `path`; true if it differs from the last one seen.
    pub(crate) fn update(&mut self, path: &Path, hash: String) -> bool {
        match self.hashes.get(path) {
            Some(old) if *old == hash => false,
            _ => {
                self.hashes.insert(path.to_path_buf(), hash);
                true
            }
        }
    }

    pub(crate) fn invalidate(&mut self, path: &Path) {
        self.hashes.remove(path);
    }
}
