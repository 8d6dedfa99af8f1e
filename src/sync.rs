//! # Directory Reconciliation
//!
//! Mirrors a source tree into a destination tree. The work happens in two
//! phases that never interleave:
//!
//! 1.  **Copy**: walk the source, create every directory, and copy every
//!     regular file over the destination unconditionally. Each relative path
//!     visited is recorded as kept.
//!
//! 2.  **Prune**: walk the destination and delete whatever is neither kept
//!     nor protected by a keep pattern. Protected directories are not
//!     descended into, and directories are only removed once empty so a
//!     protected file never loses its parents.
//!
//! Because the prune phase only starts after the copy phase finished, a
//! failure while copying never deletes anything a completed sync would have
//! preserved.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::filesystem::{copy_file, remove_if_exists, slash_path};

/// Compiled regular expressions exempting destination paths from deletion.
///
/// Patterns are searched (unanchored) in the `/`-separated path relative to
/// the destination root.
#[derive(Debug, Clone, Default)]
pub struct KeepPatterns {
    patterns: Vec<Regex>,
}

impl KeepPatterns {
    /// No protected paths
    pub fn none() -> Self {
        Self::default()
    }

    /// Compile every pattern, failing on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| Error::KeepPattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether `relative` (destination-relative, `/`-separated) is protected
    pub fn matches(&self, relative: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(relative))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// What a sync did to the destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub files_copied: usize,
    pub dirs_created: usize,
    pub removed: Vec<PathBuf>,
    pub protected: Vec<PathBuf>,
}

/// Mirror `src` into `dest`, deleting destination entries absent from `src`
/// unless they match `keep`.
pub fn sync(src: &Path, dest: &Path, keep: &KeepPatterns) -> Result<SyncReport> {
    let src = std::path::absolute(src).map_err(|e| Error::io(src, e))?;
    let dest = std::path::absolute(dest).map_err(|e| Error::io(dest, e))?;

    info!(target: "terraform_pack::sync", "syncing '{}' into '{}'", src.display(), dest.display());

    let mut report = SyncReport::default();
    let kept = copy_phase(&src, &dest, &KeepPatterns::none(), &mut report)?;
    prune_phase(&dest, &kept, keep, &mut report)?;

    debug!(
        target: "terraform_pack::sync",
        "copied {} files, removed {} entries, protected {} entries",
        report.files_copied,
        report.removed.len(),
        report.protected.len()
    );
    Ok(report)
}

/// Copy every file of `src` into `dest` without deleting anything.
///
/// Source paths matching `exclude` are skipped (directories with their whole
/// subtree). Used to merge several trees into one destination.
pub fn copy_tree(src: &Path, dest: &Path, exclude: &KeepPatterns) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    copy_phase(src, dest, exclude, &mut report)?;
    Ok(report)
}

fn copy_phase(
    src: &Path,
    dest: &Path,
    exclude: &KeepPatterns,
    report: &mut SyncReport,
) -> Result<BTreeSet<PathBuf>> {
    let src_meta = fs::metadata(src).map_err(|e| Error::io(src, e))?;
    if !src_meta.is_dir() {
        return Err(Error::Path {
            message: format!("'{}' is not a directory", src.display()),
        });
    }
    create_dir(dest, report)?;

    let mut kept = BTreeSet::new();
    let walker = WalkDir::new(src)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || e.path()
                    .strip_prefix(src)
                    .map(|rel| !exclude.matches(&slash_path(rel)))
                    .unwrap_or(true)
        });

    for entry in walker {
        let entry = entry.map_err(|e| Error::walk(src, e))?;
        if entry.depth() == 0 {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| Error::Path {
                message: format!(
                    "'{}' is not inside '{}'",
                    entry.path().display(),
                    src.display()
                ),
            })?
            .to_path_buf();
        let target = dest.join(&relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if !fs::symlink_metadata(&target)
                .map(|m| m.is_dir())
                .unwrap_or(false)
            {
                remove_if_exists(&target)?;
                create_dir(&target, report)?;
            }
        } else if file_type.is_file() {
            copy_file(entry.path(), &target)?;
            report.files_copied += 1;
        } else {
            return Err(Error::NotRegularFile {
                path: entry.path().display().to_string(),
            });
        }

        kept.insert(relative);
    }

    Ok(kept)
}

fn prune_phase(
    dest: &Path,
    kept: &BTreeSet<PathBuf>,
    keep: &KeepPatterns,
    report: &mut SyncReport,
) -> Result<()> {
    let mut protected = Vec::new();
    let mut entries = Vec::new();

    let walker = WalkDir::new(dest)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            match e.path().strip_prefix(dest) {
                Ok(rel) if !kept.contains(rel) && keep.matches(&slash_path(rel)) => {
                    protected.push(rel.to_path_buf());
                    false
                }
                _ => true,
            }
        });

    for entry in walker {
        let entry = entry.map_err(|e| Error::walk(dest, e))?;
        if entry.depth() == 0 {
            continue;
        }
        entries.push((entry.path().to_path_buf(), entry.file_type().is_dir()));
    }

    // deepest entries first so directories are seen after their contents
    for (path, is_dir) in entries.into_iter().rev() {
        let relative = match path.strip_prefix(dest) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        if kept.contains(&relative) {
            continue;
        }

        if is_dir {
            let is_empty = fs::read_dir(&path)
                .map_err(|e| Error::io(&path, e))?
                .next()
                .is_none();
            if !is_empty {
                continue;
            }
            debug!(target: "terraform_pack::sync", "removing directory '{}'", path.display());
            fs::remove_dir(&path).map_err(|e| Error::io(&path, e))?;
        } else {
            debug!(target: "terraform_pack::sync", "removing '{}'", path.display());
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
        report.removed.push(relative);
    }

    report.protected = protected;
    Ok(())
}

fn create_dir(path: &Path, report: &mut SyncReport) -> Result<()> {
    if !path.is_dir() {
        debug!(target: "terraform_pack::sync", "creating directory '{}'", path.display());
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        report.dirs_created += 1;
    }
    Ok(())
}
