//! Operation runner
//!
//! Executes planned batches: operations inside a batch run concurrently on
//! scoped threads, batches run in order. An operation whose dependency did
//! not succeed is skipped; its siblings are unaffected.

mod result;

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::error::{ForgeError, ForgeResult};
use crate::events::{EventSink, TaskEvent};
use crate::fs::relative_slash_path;
use crate::pipeline::{minify, package, translate, TaskContext};
use crate::registry::{Capability, Operation, TaskRegistry};
use crate::reload::ReloadSink;

pub use result::{OperationStatus, RunReport};

/// Runs registry operations against the configured projects.
pub struct Runner<'a> {
    registry: &'a TaskRegistry,
    ctx: TaskContext<'a>,
    events: &'a dyn EventSink,
}

impl<'a> Runner<'a> {
    pub fn new(registry: &'a TaskRegistry, ctx: TaskContext<'a>, events: &'a dyn EventSink) -> Self {
        Self {
            registry,
            ctx,
            events,
        }
    }

    pub fn config(&self) -> &Config {
        self.ctx.config
    }

    pub fn registry(&self) -> &TaskRegistry {
        self.registry
    }

    pub fn events(&self) -> &dyn EventSink {
        self.events
    }

    pub fn reload(&self) -> &dyn ReloadSink {
        self.ctx.reload
    }

    /// Run planned batches in order and report every outcome.
    pub fn run_batches(&self, batches: &[Vec<String>]) -> RunReport {
        self.events.on_event(TaskEvent::RunStarted {
            tasks: batches.iter().flatten().cloned().collect(),
        });

        let mut report = RunReport::new();
        for batch in batches {
            let mut runnable = Vec::new();
            for name in batch {
                match self.failed_dependency(name, &report) {
                    Some(dependency) => {
                        let reason = ForgeError::DependencyFailed { dependency };
                        self.events.on_event(TaskEvent::OperationSkipped {
                            task: name.clone(),
                            reason: reason.to_string(),
                        });
                        report
                            .outcomes
                            .push((name.clone(), OperationStatus::Skipped(reason)));
                    }
                    None => runnable.push(name),
                }
            }

            let outcomes: Vec<(String, OperationStatus)> = std::thread::scope(|scope| {
                let handles: Vec<_> = runnable
                    .iter()
                    .map(|name| (*name, scope.spawn(move || self.run_one(name))))
                    .collect();

                handles
                    .into_iter()
                    .map(|(name, handle)| {
                        let status = handle.join().unwrap_or_else(|_| {
                            OperationStatus::Failed(ForgeError::Io(std::io::Error::other(
                                format!("operation '{}' panicked", name),
                            )))
                        });
                        (name.clone(), status)
                    })
                    .collect()
            });
            report.outcomes.extend(outcomes);
        }

        self.events.on_event(TaskEvent::RunFinished {
            succeeded: report.succeeded(),
            failed: report.failed(),
            skipped: report.skipped(),
        });
        report
    }

    fn failed_dependency(&self, name: &str, report: &RunReport) -> Option<String> {
        self.registry
            .dependencies(name)
            .iter()
            .find(|dep| {
                report
                    .outcome(dep)
                    .map(|status| !status.is_success())
                    .unwrap_or(false)
            })
            .cloned()
    }

    /// Run one named operation, emitting its start/finish events.
    pub fn run_one(&self, name: &str) -> OperationStatus {
        self.events.on_event(TaskEvent::OperationStarted {
            task: name.to_string(),
        });
        let started = Instant::now();

        let result = match self.registry.get(name) {
            Some(op) => self.run_operation(op),
            None => Err(ForgeError::UnknownTask {
                name: name.to_string(),
            }),
        };

        match result {
            Ok(files) => {
                for file in &files {
                    self.events.on_event(TaskEvent::FileWritten {
                        task: name.to_string(),
                        path: self.display_path(file),
                    });
                }
                self.events.on_event(TaskEvent::OperationFinished {
                    task: name.to_string(),
                    files: files.len(),
                    duration_ms: started.elapsed().as_millis() as u64,
                });
                OperationStatus::Succeeded { files }
            }
            Err(err) => {
                self.events.on_event(TaskEvent::OperationFailed {
                    task: name.to_string(),
                    error: err.to_string(),
                });
                OperationStatus::Failed(err)
            }
        }
    }

    /// Dispatch to the pipeline behind an operation.
    pub fn run_operation(&self, op: &Operation) -> ForgeResult<Vec<PathBuf>> {
        let project = self
            .ctx
            .config
            .projects
            .get(op.project)
            .ok_or_else(|| ForgeError::UnknownTask {
                name: op.name.clone(),
            })?;

        match op.capability {
            Capability::Translate => translate::translate(&self.ctx, project),
            Capability::MinifyJs => minify::minify_js(&self.ctx, project),
            Capability::MinifyCss => minify::minify_css(&self.ctx, project),
            Capability::Package => package::package(&self.ctx, project),
            // long-lived; driven by the watch session
            Capability::Watch => Ok(Vec::new()),
        }
    }

    /// Paths under the plugins root print relative to it
    fn display_path(&self, path: &Path) -> String {
        let config = self.ctx.config;
        for base in [config.plugins_root(), config.base_dir.clone()] {
            if path.starts_with(&base) {
                return relative_slash_path(path, &base);
            }
        }
        path.display().to_string()
    }
}
