//! Long-lived watch loop

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{ForgeError, ForgeResult};
use crate::events::TaskEvent;
use crate::fs::{hash_content, relative_slash_path};
use crate::reload::ReloadSignal;
use crate::runner::{OperationStatus, Runner};

use super::event::{ContentTracker, WatcherState};
use super::rules::{plan_actions, WatchBatch, WatchRule};

/// Events notify sends right after registration are ignored for this long
const STARTUP_COOLDOWN: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Build the rules for the requested `watch-<short>` operations.
pub fn rules_for(runner: &Runner<'_>, watches: &[String]) -> ForgeResult<Vec<WatchRule>> {
    let registry = runner.registry();
    let config = runner.config();

    watches
        .iter()
        .map(|name| {
            let project = registry
                .get(name)
                .and_then(|op| config.projects.get(op.project))
                .ok_or_else(|| ForgeError::UnknownTask { name: name.clone() })?;
            Ok(WatchRule::for_project(name, config, registry, project))
        })
        .collect()
}

/// Watch the projects behind `watches` until `running` turns false.
///
/// Missing project directories are reported and skipped.
pub fn watch(
    runner: &Runner<'_>,
    watches: &[String],
    running: Arc<AtomicBool>,
) -> ForgeResult<()> {
    let events = runner.events();
    let rules = rules_for(runner, watches)?;

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        NotifyConfig::default(),
    )?;

    let mut active = Vec::new();
    for rule in rules {
        if !rule.project_dir.is_dir() {
            events.on_event(TaskEvent::Error {
                message: format!(
                    "{}: project directory {} not found",
                    rule.task,
                    rule.project_dir.display()
                ),
            });
            continue;
        }
        watcher.watch(&rule.project_dir, RecursiveMode::Recursive)?;
        events.on_event(TaskEvent::WatchStarted {
            task: rule.task.clone(),
            paths: vec![display_path(runner, &rule.project_dir)],
        });
        active.push(rule);
    }

    let mut state = WatcherState::new(Duration::from_millis(runner.config().watch.debounce_ms));
    let mut tracker = ContentTracker::new();

    // Startup cooldown: notify sometimes reports existing files on registration
    let cooldown_end = Instant::now() + STARTUP_COOLDOWN;
    while Instant::now() < cooldown_end && running.load(Ordering::SeqCst) {
        let _ = rx.recv_timeout(POLL_INTERVAL);
    }

    while running.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(POLL_INTERVAL) {
            let canonical_path = path.canonicalize().unwrap_or(path);
            if active.iter().any(|rule| rule.matches(&canonical_path)) {
                match std::fs::read(&canonical_path) {
                    Ok(content) => {
                        if tracker.update(&canonical_path, hash_content(&content)) {
                            state.add_change(canonical_path);
                        }
                    }
                    // Removed: forget it, but still act on it
                    Err(_) => {
                        tracker.invalidate(&canonical_path);
                        state.add_change(canonical_path);
                    }
                }
            }
        }

        if state.should_sync() {
            let changes = state.take_changes();
            for path in &changes {
                events.on_event(TaskEvent::FileChanged {
                    path: display_path(runner, path),
                });
            }
            dispatch(runner, &plan_actions(&active, &changes));
        }
    }

    drop(watcher);
    events.on_event(TaskEvent::Shutdown);
    Ok(())
}

/// Run the batch's operations in order, then reload once if asked to.
///
/// A failing operation is reported by the runner and does not stop the loop.
pub fn dispatch(runner: &Runner<'_>, batch: &WatchBatch) -> Vec<(String, OperationStatus)> {
    let outcomes: Vec<_> = batch
        .runs
        .iter()
        .map(|name| (name.clone(), runner.run_one(name)))
        .collect();

    if batch.reload {
        runner.reload().send(ReloadSignal::Reload);
    }
    outcomes
}

fn display_path(runner: &Runner<'_>, path: &Path) -> String {
    let root: PathBuf = runner.config().plugins_root();
    let root = root.canonicalize().unwrap_or(root);
    relative_slash_path(path, &root)
}
