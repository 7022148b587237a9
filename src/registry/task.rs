//! Operation and capability types

use std::fmt;

use serde::Serialize;

/// What an operation does to its project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Translate,
    MinifyJs,
    MinifyCss,
    Package,
    Watch,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Translate,
        Capability::MinifyJs,
        Capability::MinifyCss,
        Capability::Package,
        Capability::Watch,
    ];

    /// Task name prefix (`translate`, `minjs`, `mincss`, `zip`, `watch`)
    pub fn prefix(self) -> &'static str {
        match self {
            Capability::Translate => "translate",
            Capability::MinifyJs => "minjs",
            Capability::MinifyCss => "mincss",
            Capability::Package => "zip",
            Capability::Watch => "watch",
        }
    }

    /// `<prefix>-<shortname>`
    pub fn task_name(self, shortname: &str) -> String {
        format!("{}-{}", self.prefix(), shortname)
    }

    /// `<prefix>-all`
    pub fn aggregate_name(self) -> String {
        format!("{}-all", self.prefix())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One registered, runnable operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub capability: Capability,
    /// Index into `Config::projects`
    pub project: usize,
}
