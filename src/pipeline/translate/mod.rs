//! `translate-<short>`: build the project's `.pot` template

pub mod pot;
pub mod scanner;

use std::path::PathBuf;

use crate::config::ProjectDescriptor;
use crate::error::ForgeResult;
use crate::fs::{atomic_write, relative_slash_path};

use super::sources::{build_excludes, walk_relative};
use super::TaskContext;

pub use pot::{Catalog, PotEntry};
pub use scanner::{extract, Extracted};

/// Directories never scanned for PHP sources
const SCAN_EXCLUDE: &[&str] = &["node_modules/"];

/// Scan every PHP file of the project and write `<lang>/<domain>.pot`.
///
/// A missing project directory produces nothing.
pub fn translate(ctx: &TaskContext<'_>, project: &ProjectDescriptor) -> ForgeResult<Vec<PathBuf>> {
    let project_dir = ctx.config.project_dir(project);
    if !project_dir.is_dir() {
        return Ok(Vec::new());
    }

    let catalog = scan_project(&project_dir, &project.domain)?;

    let target = project
        .lang
        .resolve(&project_dir)
        .join(project.pot_file_name());
    let content = pot::render(project, &ctx.config.translate, ctx.now(), &catalog);
    atomic_write(&target, content.as_bytes())?;

    Ok(vec![target])
}

/// Collect the catalog of one project directory.
///
/// Files are visited in relative-path order so the result does not depend
/// on directory listing order.
pub fn scan_project(project_dir: &std::path::Path, domain: &str) -> ForgeResult<Catalog> {
    let patterns: Vec<String> = SCAN_EXCLUDE.iter().map(|p| p.to_string()).collect();
    let excludes = build_excludes(project_dir, &patterns)?;

    let mut catalog = Catalog::new();
    for entry in walk_relative(project_dir, Some(excludes))? {
        if entry.is_dir || entry.path.extension().and_then(|e| e.to_str()) != Some("php") {
            continue;
        }
        let full = project_dir.join(&entry.path);
        let bytes = std::fs::read(&full)?;
        let source = String::from_utf8_lossy(&bytes);
        let rel = relative_slash_path(&full, project_dir);
        for found in extract(&source, domain) {
            catalog.add(&rel, found);
        }
    }

    Ok(catalog)
}
