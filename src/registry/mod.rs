//! Task registry
//!
//! `TaskRegistry::build` derives every named operation from the project
//! descriptors once at startup. The result is immutable: operations,
//! aggregates and the dependency edges used by the planner.

mod graph;
mod task;
#[cfg(test)]
mod tests;

use std::collections::HashMap;

use crate::config::ProjectDescriptor;
use crate::error::{ForgeError, ForgeResult};

pub use graph::Plan;
pub use task::{Capability, Operation};

/// Entry point run when no task name is given: `watch-all` plus the dev server.
pub const DEFAULT_TASK: &str = "default";

/// Immutable mapping from task names to operations and aggregates.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    /// Registration order
    operations: Vec<Operation>,
    index: HashMap<String, usize>,
    /// Aggregate name to member names, in registration order
    aggregates: Vec<(String, Vec<String>)>,
    dependencies: HashMap<String, Vec<String>>,
}

impl TaskRegistry {
    /// Derive all operations for the given projects.
    ///
    /// Fails if two projects share a shortname.
    pub fn build(projects: &[ProjectDescriptor]) -> ForgeResult<Self> {
        let mut registry = Self::default();
        let mut seen: HashMap<&str, &str> = HashMap::new();

        for (idx, project) in projects.iter().enumerate() {
            if let Some(first) = seen.insert(&project.shortname, &project.name) {
                return Err(ForgeError::DuplicateShortname {
                    shortname: project.shortname.clone(),
                    first: first.to_string(),
                    second: project.name.clone(),
                });
            }

            let short = project.shortname.as_str();
            let mut zip_deps = Vec::new();

            zip_deps.push(registry.insert(Capability::Translate, short, idx));
            if project.has_js() {
                zip_deps.push(registry.insert(Capability::MinifyJs, short, idx));
            }
            if project.has_css() {
                zip_deps.push(registry.insert(Capability::MinifyCss, short, idx));
            }

            let zip = registry.insert(Capability::Package, short, idx);
            registry.dependencies.insert(zip, zip_deps);

            registry.insert(Capability::Watch, short, idx);
        }

        for capability in Capability::ALL {
            let members = registry
                .operations
                .iter()
                .filter(|op| op.capability == capability)
                .map(|op| op.name.clone())
                .collect();
            registry
                .aggregates
                .push((capability.aggregate_name(), members));
        }
        registry.aggregates.push((
            DEFAULT_TASK.to_string(),
            vec![Capability::Watch.aggregate_name()],
        ));

        Ok(registry)
    }

    fn insert(&mut self, capability: Capability, shortname: &str, project: usize) -> String {
        let name = capability.task_name(shortname);
        self.index.insert(name.clone(), self.operations.len());
        self.operations.push(Operation {
            name: name.clone(),
            capability,
            project,
        });
        name
    }

    /// Look up a single (non-aggregate) operation
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    /// True for operations, aggregates and `default`
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name) || self.aggregate(name).is_some()
    }

    /// All operations in registration order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    /// Members of an aggregate
    pub fn aggregate(&self, name: &str) -> Option<&[String]> {
        self.aggregates
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, members)| members.as_slice())
    }

    /// All aggregates in registration order
    pub fn aggregates(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.aggregates
            .iter()
            .map(|(n, members)| (n.as_str(), members.as_slice()))
    }

    /// Direct dependencies of an operation (empty for most)
    pub fn dependencies(&self, name: &str) -> &[String] {
        self.dependencies
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Position of an operation in registration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Resolve requested names into concrete operation names.
    ///
    /// Aggregates expand to their members (recursively); duplicates are
    /// dropped keeping first occurrence.
    pub fn expand(&self, names: &[String]) -> ForgeResult<Vec<String>> {
        let mut out = Vec::new();
        for name in names {
            self.expand_into(name, &mut out, 0)?;
        }
        Ok(out)
    }

    fn expand_into(&self, name: &str, out: &mut Vec<String>, depth: usize) -> ForgeResult<()> {
        if depth > self.aggregates.len() {
            return Err(ForgeError::DependencyCycle {
                name: name.to_string(),
            });
        }

        if self.index.contains_key(name) {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
            return Ok(());
        }

        match self.aggregate(name) {
            Some(members) => {
                for member in members {
                    self.expand_into(member, out, depth + 1)?;
                }
                Ok(())
            }
            None => Err(ForgeError::UnknownTask {
                name: name.to_string(),
            }),
        }
    }

    /// Expand names, pull in dependencies and order them into batches.
    pub fn plan(&self, names: &[String]) -> ForgeResult<Plan> {
        let serve = names.iter().any(|n| n == DEFAULT_TASK);
        let expanded = self.expand(names)?;
        graph::plan(self, &expanded, serve)
    }
}
