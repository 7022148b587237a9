//! What a changed path means for one watched project
//!
//! - non-minified `*.js` directly in a JS location: run `minjs`, then reload
//! - non-minified `*.css` directly in a CSS location: run `mincss`
//!   (which injects the stylesheet)
//! - `*.php` anywhere in the project: reload

use std::path::{Path, PathBuf};

use crate::config::{Config, ProjectDescriptor};
use crate::pipeline::sources::is_minified;
use crate::registry::{Capability, TaskRegistry};

/// Follow-up for a changed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// Run the named operation
    Run(String),
    /// Full page reload in connected browsers
    Reload,
}

/// Path classification for one `watch-<short>` operation
#[derive(Debug, Clone)]
pub struct WatchRule {
    pub task: String,
    pub project_dir: PathBuf,
    js_dirs: Vec<PathBuf>,
    css_dirs: Vec<PathBuf>,
    minjs: Option<String>,
    mincss: Option<String>,
}

fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

impl WatchRule {
    pub fn for_project(
        task: &str,
        config: &Config,
        registry: &TaskRegistry,
        project: &ProjectDescriptor,
    ) -> Self {
        let project_dir = canonical(config.project_dir(project));
        let minjs = Capability::MinifyJs.task_name(&project.shortname);
        let mincss = Capability::MinifyCss.task_name(&project.shortname);

        Self {
            task: task.to_string(),
            js_dirs: project
                .js
                .iter()
                .map(|l| canonical(l.resolve(&project_dir)))
                .collect(),
            css_dirs: project
                .css
                .iter()
                .map(|l| canonical(l.resolve(&project_dir)))
                .collect(),
            minjs: registry.contains(&minjs).then_some(minjs),
            mincss: registry.contains(&mincss).then_some(mincss),
            project_dir,
        }
    }

    /// Actions for one changed (canonical) path, in order
    pub fn classify(&self, path: &Path) -> Vec<WatchAction> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parent = path.parent();

        match ext {
            "js" if !is_minified(path, "js") => {
                if let Some(minjs) = &self.minjs {
                    if parent.map(|p| self.js_dirs.iter().any(|d| d == p)).unwrap_or(false) {
                        return vec![WatchAction::Run(minjs.clone()), WatchAction::Reload];
                    }
                }
                Vec::new()
            }
            "css" if !is_minified(path, "css") => {
                if let Some(mincss) = &self.mincss {
                    if parent.map(|p| self.css_dirs.iter().any(|d| d == p)).unwrap_or(false) {
                        return vec![WatchAction::Run(mincss.clone())];
                    }
                }
                Vec::new()
            }
            "php" => {
                let inside = path.starts_with(&self.project_dir)
                    && !path.components().any(|c| c.as_os_str() == "node_modules");
                if inside {
                    vec![WatchAction::Reload]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    /// True if any follow-up exists for `path`
    pub fn matches(&self, path: &Path) -> bool {
        !self.classify(path).is_empty()
    }
}

/// Operations to run and whether to reload, for one debounced batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchBatch {
    pub runs: Vec<String>,
    pub reload: bool,
}

/// Merge the actions of every changed path across all rules.
pub fn plan_actions(rules: &[WatchRule], changes: &[PathBuf]) -> WatchBatch {
    let mut batch = WatchBatch::default();
    for path in changes {
        for rule in rules {
            for action in rule.classify(path) {
                match action {
                    WatchAction::Run(name) => {
                        if !batch.runs.contains(&name) {
                            batch.runs.push(name);
                        }
                    }
                    WatchAction::Reload => batch.reload = true,
                }
            }
        }
    }
    batch
}
