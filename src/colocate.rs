//! # Dependency Colocation
//!
//! Places each dependency's materialized output underneath the consumer's
//! output directory and points the consumer's references at it.
//!
//! ## Process
//!
//! 1.  **Resolve**: load every dependency's metadata before anything is
//!     touched. One unreadable or corrupt record aborts the whole call.
//!
//! 2.  **Validate**: reject alias collisions between dependencies, since the
//!     later rewrite would otherwise silently win.
//!
//! 3.  **Rewrite**: for each alias of a dependency, rewrite the consumer's
//!     tree so `source = "<alias>"` points at the dependency's placement.
//!
//! 4.  **Reconcile**: sync the dependency's output into its placement.
//!
//! Dependencies are processed in the given order. A failure in steps 3 or 4
//! leaves earlier dependencies colocated; nothing is rolled back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use crate::path::placement_path;
use crate::rewrite::{ReferenceRewriter, RegexRewriter, RewriteReport};
use crate::sync::{sync, KeepPatterns};

/// A dependency whose metadata has been resolved
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub path: PathBuf,
    pub metadata: Metadata,
    pub placement: PathBuf,
}

/// Outcome of one colocation call
#[derive(Debug, Clone, Default)]
pub struct ColocationReport {
    pub dependencies: Vec<ResolvedDependency>,
    pub rewrite: RewriteReport,
}

/// Colocates dependencies using an injected [`ReferenceRewriter`].
pub struct Colocator<R: ReferenceRewriter = RegexRewriter> {
    metadata_file: PathBuf,
    rewriter: R,
}

impl Colocator<RegexRewriter> {
    /// Colocator reading dependency metadata from `metadata_file` (relative
    /// to each dependency) with the regex rewriter.
    pub fn new(metadata_file: impl Into<PathBuf>) -> Self {
        Self::with_rewriter(metadata_file, RegexRewriter::new())
    }
}

impl<R: ReferenceRewriter> Colocator<R> {
    pub fn with_rewriter(metadata_file: impl Into<PathBuf>, rewriter: R) -> Self {
        Self {
            metadata_file: metadata_file.into(),
            rewriter,
        }
    }

    /// Load and validate every dependency's metadata without touching the
    /// output directory.
    pub fn resolve<P: AsRef<Path>>(&self, dependencies: &[P]) -> Result<Vec<ResolvedDependency>> {
        let mut resolved: Vec<ResolvedDependency> = Vec::new();
        for dependency in dependencies {
            let path = dependency.as_ref();
            if resolved
                .iter()
                .any(|r| r.path.components().eq(path.components()))
            {
                debug!(target: "terraform_pack::colocate", "skipping repeated dependency '{}'", path.display());
                continue;
            }

            let metadata = Metadata::load(&path.join(&self.metadata_file)).map_err(|e| {
                Error::Colocation {
                    dependency: path.display().to_string(),
                    source: Box::new(e),
                }
            })?;
            resolved.push(ResolvedDependency {
                path: path.to_path_buf(),
                placement: placement_path(path),
                metadata,
            });
        }

        check_alias_collisions(&resolved)?;
        Ok(resolved)
    }

    /// Colocate `dependencies` into `output_dir`.
    pub fn colocate<P: AsRef<Path>>(
        &self,
        output_dir: &Path,
        dependencies: &[P],
    ) -> Result<ColocationReport> {
        let resolved = self.resolve(dependencies)?;
        let output_abs = std::path::absolute(output_dir).map_err(|e| Error::io(output_dir, e))?;

        let mut report = ColocationReport::default();
        for dependency in &resolved {
            self.colocate_one(&output_abs, dependency, &mut report.rewrite)
                .map_err(|e| Error::Colocation {
                    dependency: dependency.path.display().to_string(),
                    source: Box::new(e),
                })?;
        }

        report.dependencies = resolved;
        Ok(report)
    }

    fn colocate_one(
        &self,
        output_abs: &Path,
        dependency: &ResolvedDependency,
        rewrite: &mut RewriteReport,
    ) -> Result<()> {
        let destination = output_abs.join(&dependency.placement);
        let replacement = destination.display().to_string();

        info!(
            target: "terraform_pack::colocate",
            "colocating {} from '{}' at '{}'",
            dependency.metadata.target,
            dependency.path.display(),
            dependency.placement.display()
        );

        for alias in &dependency.metadata.aliases {
            let pass = self.rewriter.rewrite(alias, &replacement, output_abs)?;
            rewrite.merge(pass);
        }

        sync(&dependency.path, &destination, &KeepPatterns::none())?;
        Ok(())
    }
}

/// Colocate `dependencies` into `output_dir`, reading each dependency's
/// metadata from `metadata_file`.
pub fn colocate_modules<P: AsRef<Path>>(
    metadata_file: &Path,
    output_dir: &Path,
    dependencies: &[P],
) -> Result<ColocationReport> {
    Colocator::new(metadata_file).colocate(output_dir, dependencies)
}

fn check_alias_collisions(resolved: &[ResolvedDependency]) -> Result<()> {
    let mut owners: HashMap<&str, &Path> = HashMap::new();
    for dependency in resolved {
        for alias in &dependency.metadata.aliases {
            if let Some(first) = owners.insert(alias.as_str(), dependency.path.as_path()) {
                if first != dependency.path.as_path() {
                    return Err(Error::AliasCollision {
                        alias: alias.clone(),
                        first: first.display().to_string(),
                        second: dependency.path.display().to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}
