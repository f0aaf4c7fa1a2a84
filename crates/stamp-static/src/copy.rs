//! Auxiliary file copying.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::builder::BuildError;

/// Files copied next to the built page when no list is configured.
pub const DEFAULT_COPY_FILES: &[&str] = &["config.example.js"];

/// Outcome of copying the auxiliary files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Files written into the output directory (relative paths)
    pub copied: Vec<PathBuf>,

    /// Files that did not exist in the project root
    pub skipped: Vec<PathBuf>,
}

/// Copy each of `files` from `root` into `output_dir`, keeping relative paths.
///
/// Missing sources are skipped. Entries that are absolute or climb out with
/// `..` are rejected before anything is copied. Any other I/O failure aborts
/// the copy.
pub fn copy_auxiliary(
    root: &Path,
    output_dir: &Path,
    files: &[PathBuf],
) -> Result<CopyReport, BuildError> {
    if let Some(file) = files.iter().find(|f| !is_contained(f)) {
        return Err(BuildError::CopyError {
            path: file.display().to_string(),
            message: "path must be relative and stay inside the output directory".to_string(),
        });
    }

    let mut report = CopyReport::default();

    for file in files {
        let source = root.join(file);

        if !source.is_file() {
            tracing::debug!("Skipping {}: not found", source.display());
            report.skipped.push(file.clone());
            continue;
        }

        let target = output_dir.join(file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", parent.display(), e)))?;
        }

        // Copying a file onto itself truncates it.
        if same_file(&source, &target) {
            return Err(BuildError::CopyError {
                path: source.display().to_string(),
                message: "source and target are the same file".to_string(),
            });
        }

        fs::copy(&source, &target).map_err(|e| BuildError::CopyError {
            path: source.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!("Copied {} -> {}", source.display(), target.display());
        report.copied.push(file.clone());
    }

    Ok(report)
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Whether `a` and `b` name the same file once their directories are
/// resolved. `b` need not exist yet.
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    fn resolve(path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        Some(fs::canonicalize(parent).ok()?.join(name))
    }

    match (resolve(a), resolve(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
