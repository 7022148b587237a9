//! Source file matching
//!
//! Two shapes of match are needed: flat "`*.ext` in this directory, minus
//! `*.min.ext`" for asset minification, and recursive walks (PHP sources,
//! package contents) that skip dotfiles and honour gitignore-style
//! exclusions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;

use crate::error::{ForgeError, ForgeResult};

/// `*.<ext>` directly inside `dir`, excluding already minified `*.min.<ext>`.
///
/// A missing directory matches nothing.
pub fn match_assets(dir: &Path, ext: &str) -> ForgeResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let min_suffix = format!(".min.{}", ext);
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.extension().and_then(|e| e.to_str()) == Some(ext) && !name.ends_with(&min_suffix)
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// True if `path` is a minified output (`x.min.js`) for `ext`
pub fn is_minified(path: &Path, ext: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(&format!(".min.{}", ext)))
        .unwrap_or(false)
}

/// Build a matcher from gitignore-style patterns rooted at `root`.
pub fn build_excludes(root: &Path, patterns: &[String]) -> ForgeResult<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| ForgeError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
    }
    builder.build().map_err(|e| ForgeError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

/// Recursive walk of `root` returning paths relative to it, sorted.
///
/// Dotfiles and dot-directories are skipped. Directories matched by
/// `excludes` are not descended into. A missing root yields nothing.
pub fn walk_relative(root: &Path, excludes: Option<Gitignore>) -> ForgeResult<Vec<WalkEntry>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let excludes = excludes.map(Arc::new);
    let filter_root = root.to_path_buf();
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    if let Some(matcher) = excludes {
        builder.filter_entry(move |entry| {
            let Ok(rel) = entry.path().strip_prefix(&filter_root) else {
                return true;
            };
            if rel.as_os_str().is_empty() {
                return true;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !matcher.matched(rel, is_dir).is_ignore()
        });
    }

    let mut entries = Vec::new();
    for result in builder.build() {
        let entry = result.map_err(|e| ForgeError::Io(std::io::Error::other(e.to_string())))?;
        if entry.depth() == 0 {
            continue;
        }
        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push(WalkEntry { path: rel, is_dir });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// One walked path, relative to the walk root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn match_assets_skips_minified() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.js"));
        touch(&dir.path().join("a.min.js"));
        touch(&dir.path().join("b.js"));
        touch(&dir.path().join("a.js.map"));
        touch(&dir.path().join("style.css"));

        let files = match_assets(dir.path(), "js").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(names, vec!["a.js", "b.js"]);
    }

    #[test]
    fn match_assets_is_not_recursive() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("vendor").join("lib.js"));

        assert!(match_assets(dir.path(), "js").unwrap().is_empty());
    }

    #[test]
    fn match_assets_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        assert!(match_assets(&dir.path().join("nope"), "css")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn is_minified_checks_suffix() {
        assert!(is_minified(Path::new("js/a.min.js"), "js"));
        assert!(!is_minified(Path::new("js/a.js"), "js"));
        assert!(!is_minified(Path::new("css/a.min.js"), "css"));
    }

    #[test]
    fn walk_relative_applies_excludes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("plugin.php"));
        touch(&root.join("node_modules").join("pkg").join("index.js"));
        touch(&root.join("assets").join("sass").join("main.scss"));
        touch(&root.join("assets").join("css").join("main.css"));
        touch(&root.join("gulpfile.js"));
        touch(&root.join(".git").join("HEAD"));

        let excludes = build_excludes(
            root,
            &[
                "/node_modules/".to_string(),
                "/assets/sass/".to_string(),
                "/gulpfile.js".to_string(),
            ],
        )
        .unwrap();
        let entries = walk_relative(root, Some(excludes)).unwrap();
        let files: Vec<_> = entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.path.to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(files, vec!["assets/css/main.css", "plugin.php"]);
    }

    #[test]
    fn walk_relative_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        assert!(walk_relative(&dir.path().join("missing"), None)
            .unwrap()
            .is_empty());
    }
}
