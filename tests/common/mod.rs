//! Common test utilities for pressforge CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated workspace with a `pressforge.toml` and plugin trees
//! - Fixtures: reusable PHP/JS/CSS content

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
