//! File helpers shared by the pipelines
//!
//! Every output file is written through `atomic_write` so a watcher never
//! observes a half-written `.min.js` or archive.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::ForgeResult;

/// Write content to a file atomically
///
/// Uses tempfile + rename in the destination directory. Parent directories
/// are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> ForgeResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut temp = NamedTempFile::new_in(&parent)?;
    temp.write_all(content)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Compute SHA-256 hash of content, `sha256:`-prefixed
pub fn hash_content(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("sha256:{}", hex)
}

/// Path of `path` relative to `base`, with forward slashes.
///
/// Falls back to the full path when `path` is not under `base`.
pub fn relative_slash_path(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
