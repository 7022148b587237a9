//! `zip-<short>`: distributable archives
//!
//! The project folder is zipped once in memory and written twice: the
//! current build to `<dist>/<folder>.zip` and a dated copy to
//! `<archive>/<folder>_<day>_<month>_<year>.zip`.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ProjectDescriptor;
use crate::error::{ForgeError, ForgeResult};
use crate::fs::{atomic_write, relative_slash_path};

use super::sources::{build_excludes, walk_relative};
use super::TaskContext;

/// Zip a project into the dist and archive directories.
///
/// Returns nothing when the project directory is missing or every file in
/// it is excluded.
pub fn package(ctx: &TaskContext<'_>, project: &ProjectDescriptor) -> ForgeResult<Vec<PathBuf>> {
    let project_dir = ctx.config.project_dir(project);
    if !project_dir.is_dir() {
        return Ok(Vec::new());
    }

    let (dist_name, archive_name) = archive_names(&project.folder, ctx.now().date_naive());
    let dist_path = ctx.config.dist_dir().join(dist_name);
    let archive_path = ctx.config.archive_dir().join(archive_name);

    let Some(bytes) = build_archive(
        &project_dir,
        &project.folder,
        &ctx.config.package.exclude,
        &dist_path,
    )?
    else {
        return Ok(Vec::new());
    };

    atomic_write(&dist_path, &bytes)?;
    atomic_write(&archive_path, &bytes)?;

    Ok(vec![dist_path, archive_path])
}

/// (`<folder>.zip`, `<folder>_<day>_<month>_<year>.zip`), unpadded
pub fn archive_names(folder: &str, date: NaiveDate) -> (String, String) {
    (
        format!("{}.zip", folder),
        format!(
            "{}_{}_{}_{}.zip",
            folder,
            date.day(),
            date.month(),
            date.year()
        ),
    )
}

/// Zip `project_dir` with entries rooted at `<root_name>/`.
///
/// `None` if no file survives the exclusions. `target` only labels errors.
pub fn build_archive(
    project_dir: &Path,
    root_name: &str,
    exclude: &[String],
    target: &Path,
) -> ForgeResult<Option<Vec<u8>>> {
    let excludes = build_excludes(project_dir, exclude)?;
    let entries = walk_relative(project_dir, Some(excludes))?;
    if !entries.iter().any(|e| !e.is_dir) {
        return Ok(None);
    }

    let archive_err = |e: zip::result::ZipError| ForgeError::Archive {
        path: target.to_path_buf(),
        message: e.to_string(),
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let dir_options = SimpleFileOptions::default().unix_permissions(0o755);
    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    zip.add_directory(format!("{}/", root_name), dir_options)
        .map_err(archive_err)?;

    for entry in entries {
        let full = project_dir.join(&entry.path);
        let name = format!("{}/{}", root_name, relative_slash_path(&full, project_dir));
        if entry.is_dir {
            zip.add_directory(format!("{}/", name), dir_options)
                .map_err(archive_err)?;
        } else {
            let content = std::fs::read(&full)?;
            zip.start_file(name, file_options).map_err(archive_err)?;
            zip.write_all(&content)?;
        }
    }

    let cursor = zip.finish().map_err(archive_err)?;
    Ok(Some(cursor.into_inner()))
}
