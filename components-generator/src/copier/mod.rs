//! File copy primitives
//!
//! Two operations back every build step:
//!
//! - [`copy_files`]: copies an explicit list of relative names between two
//!   directories, without recursing.
//! - [`plan_tree`] + [`CopyPlan::execute`]: mirrors a directory tree. The plan
//!   is computed first so it can be inspected (dry run) before anything is
//!   written.
//!
//! Failures here are recoverable: each one is logged, recorded in the
//! [`CopyReport`] and the remaining entries are still processed.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single file copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOp {
    /// File to read
    pub source: PathBuf,
    /// File to write
    pub destination: PathBuf,
}

/// Outcome of executing copies
#[derive(Debug, Default, Clone)]
pub struct CopyReport {
    /// Destination paths written successfully
    pub copied: Vec<PathBuf>,
    /// Paths that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl CopyReport {
    /// Fold another report into this one
    pub fn merge(&mut self, other: Self) {
        self.copied.extend(other.copied);
        self.failed.extend(other.failed);
    }

    /// True when nothing failed
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, op: &CopyOp) {
        match copy_one(&op.source, &op.destination) {
            Ok(()) => self.copied.push(op.destination.clone()),
            Err(e) => {
                tracing::warn!(
                    source = %op.source.display(),
                    destination = %op.destination.display(),
                    error = %e,
                    "Error: file was not able to be copied"
                );
                self.failed.push((op.source.clone(), e.to_string()));
            }
        }
    }
}

/// Copies of a whole directory tree, computed ahead of execution
#[derive(Debug, Default, Clone)]
pub struct CopyPlan {
    root: Option<PathBuf>,
    dirs: Vec<PathBuf>,
    files: Vec<CopyOp>,
}

impl CopyPlan {
    /// Destination root, `None` when the source was not a directory
    #[must_use]
    pub const fn root(&self) -> Option<&PathBuf> {
        self.root.as_ref()
    }

    /// Directories that will be created, parents first
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// File copies in walk order
    #[must_use]
    pub fn files(&self) -> &[CopyOp] {
        &self.files
    }

    /// True when executing would do nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Run the plan
    ///
    /// With `wipe_target` an existing destination root is deleted and recreated
    /// first, so the result never mixes with an earlier build.
    pub fn execute(&self, wipe_target: bool) -> CopyReport {
        let mut report = CopyReport::default();
        let Some(root) = &self.root else {
            return report;
        };

        ensure_directory(root, wipe_target);
        for dir in &self.dirs {
            ensure_directory(dir, false);
        }
        for op in &self.files {
            report.record(op);
        }

        report
    }
}

/// Plan a recursive copy of `source` into `target`
///
/// Names in `exclude` are matched against entries directly under `source`
/// only. Deeper entries are always copied, even when they share a name with
/// an excluded root entry.
#[must_use]
pub fn plan_tree(source: &Path, target: &Path, exclude: &[String]) -> CopyPlan {
    if !source.is_dir() {
        return CopyPlan::default();
    }

    let mut plan = CopyPlan {
        root: Some(target.to_path_buf()),
        ..CopyPlan::default()
    };

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() != 1
                || !exclude
                    .iter()
                    .any(|name| entry.file_name().to_string_lossy() == name.as_str())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Error: entry was not able to be read");
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            plan.dirs.push(destination);
        } else {
            plan.files.push(CopyOp {
                source: entry.path().to_path_buf(),
                destination,
            });
        }
    }

    plan
}

/// Copy named files from `source_dir` into `target_dir`
///
/// Does nothing, not even creating `target_dir`, when `files` is empty.
pub fn copy_files<S: AsRef<str>>(source_dir: &Path, files: &[S], target_dir: &Path) -> CopyReport {
    let mut report = CopyReport::default();
    if files.is_empty() {
        return report;
    }

    ensure_directory(target_dir, false);

    for file in files {
        let name = file.as_ref();
        report.record(&CopyOp {
            source: source_dir.join(name),
            destination: target_dir.join(name),
        });
    }

    report
}

/// Make sure `directory` exists, optionally starting from an empty one
///
/// Returns `false` (after logging) if the directory could not be created.
pub fn ensure_directory(directory: &Path, delete_if_exists: bool) -> bool {
    if directory.is_dir() {
        if !delete_if_exists {
            return true;
        }
        if let Err(e) = fs::remove_dir_all(directory) {
            tracing::error!(
                path = %directory.display(),
                error = %e,
                "Error: directory was not able to be deleted"
            );
        }
    }

    match fs::create_dir_all(directory) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                path = %directory.display(),
                error = %e,
                "Error: directory was not able to be created"
            );
            false
        }
    }
}

/// Delete a file, logging instead of failing
pub fn delete_file(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Error: file was not able to be deleted"
            );
            false
        }
    }
}

fn copy_one(source: &Path, destination: &Path) -> std::io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination).map(|_| ())
}
