//! Dependency graph and batch planning
//!
//! Packaging depends on translation and minification of the same project.
//! The planner takes the transitive closure of the requested operations and
//! layers it into batches (Kahn's algorithm): every operation in a batch has
//! all of its dependencies in earlier batches, so a batch can run in
//! parallel.

use std::collections::{HashMap, HashSet};

use crate::error::{ForgeError, ForgeResult};

use super::task::Capability;
use super::TaskRegistry;

/// Execution plan for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Finite operations, in dependency order
    pub batches: Vec<Vec<String>>,
    /// Long-lived watch operations, started after the batches
    pub watches: Vec<String>,
    /// Start the live-reload dev server
    pub serve: bool,
}

impl Plan {
    /// All finite operations in execution order
    pub fn operations(&self) -> impl Iterator<Item = &String> {
        self.batches.iter().flatten()
    }
}

pub(super) fn plan(registry: &TaskRegistry, requested: &[String], serve: bool) -> ForgeResult<Plan> {
    let mut watches = Vec::new();
    let mut closure: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = Vec::new();

    for name in requested {
        let is_watch = registry
            .get(name)
            .map(|op| op.capability == Capability::Watch)
            .unwrap_or(false);
        if is_watch {
            if !watches.contains(name) {
                watches.push(name.clone());
            }
        } else {
            stack.push(name.clone());
        }
    }

    while let Some(name) = stack.pop() {
        if !seen.insert(name.clone()) {
            continue;
        }
        for dep in registry.dependencies(&name) {
            if registry.get(dep).is_none() {
                return Err(ForgeError::UnknownTask { name: dep.clone() });
            }
            stack.push(dep.clone());
        }
        closure.push(name);
    }

    // Stable order inside batches: registration order
    closure.sort_by_key(|name| registry.position(name).unwrap_or(usize::MAX));

    let mut remaining: HashMap<&str, usize> = closure
        .iter()
        .map(|name| {
            let deps = registry.dependencies(name).len();
            (name.as_str(), deps)
        })
        .collect();

    let mut batches = Vec::new();
    while !remaining.is_empty() {
        let ready: Vec<String> = closure
            .iter()
            .filter(|name| remaining.get(name.as_str()) == Some(&0))
            .cloned()
            .collect();

        if ready.is_empty() {
            let stuck = closure
                .iter()
                .find(|name| remaining.contains_key(name.as_str()))
                .cloned()
                .unwrap_or_default();
            return Err(ForgeError::DependencyCycle { name: stuck });
        }

        for name in &ready {
            remaining.remove(name.as_str());
        }
        for name in &closure {
            if let Some(count) = remaining.get_mut(name.as_str()) {
                let satisfied = registry
                    .dependencies(name)
                    .iter()
                    .filter(|dep| ready.contains(dep))
                    .count();
                *count -= satisfied;
            }
        }

        batches.push(ready);
    }

    Ok(Plan {
        batches,
        watches,
        serve,
    })
}
