//! pressforge - build tool for WordPress plugins
//!
//! A fixed table of plugin projects becomes a registry of named operations
//! (translation templates, JS/CSS minification with source maps, packaging,
//! watching). Requested operations are planned into dependency-ordered
//! batches and run concurrently; `default` watches every project behind a
//! live-reload proxy.

pub mod config;
pub mod devserver;
pub mod error;
pub mod events;
pub mod fs;
pub mod pipeline;
pub mod registry;
pub mod reload;
pub mod runner;
pub mod watcher;

// Re-exports for convenience
pub use config::{Config, ProjectDescriptor};
pub use error::{ForgeError, ForgeResult};
pub use events::{EventSink, TaskEvent};
pub use registry::{Capability, Plan, TaskRegistry};
pub use runner::{OperationStatus, RunReport, Runner};
