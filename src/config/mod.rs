//! Configuration module for pressforge
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (PRESSFORGE_*)
//! 3. Project config (`pressforge.toml`, or `--config <path>`)
//! 4. Built-in project table and defaults (lowest priority)

mod defaults;
mod loader;
mod location;
#[cfg(test)]
mod tests;
mod types;

pub use loader::{ConfigWarning, CONFIG_FILE_NAME};
pub use location::Location;
pub use types::{
    Config, CssConfig, PackageConfig, PathsConfig, ProjectDescriptor, ServerConfig,
    TranslateConfig, WatchConfig,
};
