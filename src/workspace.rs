//! # Runnable Workspaces
//!
//! Terraform cannot run inside the build output tree: it creates symlinks
//! the build tool removes, and plans embed absolute paths. A workspace is a
//! reconciled copy of a built root module under the workspace base directory
//! that keeps Terraform's own working data between runs.
//!
//! ## Process
//!
//! 1.  **Resolve**: make the base directory and a Terraform binary living in
//!     the build output tree absolute against the repository root.
//!
//! 2.  **Reconcile**: sync the root module into `<base>/<root_module>`,
//!     protecting `.terraform*`, `*.tfstate` and the build output link.
//!
//! 3.  **Link**: point `<workspace>/plz-out` at the repository's build output
//!     directory so absolute module paths keep resolving.
//!
//! The caller prints [`Workspace::shell_snippet`] for the user's shell to
//! evaluate.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::WorkspaceConfig;
use crate::error::{Error, Result};
use crate::sync::{sync, KeepPatterns, SyncReport};

/// A prepared workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    pub dir: PathBuf,
    pub repo_root: PathBuf,
    pub terraform_binary: PathBuf,
    pub sync: SyncReport,
}

impl Workspace {
    /// Shell lines that put Terraform on `PATH`, point `GIT_DIR` at the
    /// repository and enter the workspace.
    pub fn shell_snippet(&self) -> String {
        let bin_dir = self
            .terraform_binary
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        format!(
            "PATH=\"{}:$PATH\"\nexport PATH\nGIT_DIR=\"{}/.git\"\nexport GIT_DIR\ncd \"{}\"\n",
            bin_dir,
            self.repo_root.display(),
            self.dir.display()
        )
    }
}

/// Absolute path of `binary` when it lives in the build output tree,
/// otherwise `binary` unchanged.
pub fn resolve_terraform_binary(binary: &Path, repo_root: &Path, plz_out_dir: &str) -> PathBuf {
    let relative = binary.strip_prefix("/").unwrap_or(binary);
    if relative.starts_with(plz_out_dir) {
        let absolute = repo_root.join(relative);
        debug!(
            target: "terraform_pack::workspace",
            "resolved terraform binary to '{}'",
            absolute.display()
        );
        absolute
    } else {
        binary.to_path_buf()
    }
}

/// Reconcile `config.root_module` into its workspace and link the build
/// output directory into it.
pub fn prepare_workspace(config: &WorkspaceConfig) -> Result<Workspace> {
    let repo_root = &config.repo_root;
    let base_dir = repo_root.join(&config.base_dir);
    let root_module = module_relative_path(&config.root_module, repo_root)?;
    let dir = base_dir.join(&root_module);

    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    let mut patterns = config.keep_patterns.clone();
    patterns.push(format!("^{}$", regex::escape(&config.plz_out_dir)));
    let keep = KeepPatterns::new(&patterns)?;

    info!(
        target: "terraform_pack::workspace",
        "preparing workspace '{}' from '{}'",
        dir.display(),
        root_module.display()
    );
    let report = sync(&repo_root.join(&root_module), &dir, &keep)?;

    link_plz_out(&repo_root.join(&config.plz_out_dir), &dir.join(&config.plz_out_dir))?;

    Ok(Workspace {
        terraform_binary: resolve_terraform_binary(
            &config.terraform_binary,
            repo_root,
            &config.plz_out_dir,
        ),
        repo_root: repo_root.clone(),
        dir,
        sync: report,
    })
}

fn module_relative_path(root_module: &Path, repo_root: &Path) -> Result<PathBuf> {
    if root_module.is_relative() {
        return Ok(root_module.to_path_buf());
    }
    root_module
        .strip_prefix(repo_root)
        .map(Path::to_path_buf)
        .map_err(|_| Error::Path {
            message: format!(
                "root module '{}' is outside the repository '{}'",
                root_module.display(),
                repo_root.display()
            ),
        })
}

fn link_plz_out(target: &Path, link: &Path) -> Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        debug!(target: "terraform_pack::workspace", "'{}' already present", link.display());
        return Ok(());
    }
    create_symlink(target, link).map_err(|e| Error::io(link, e))
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
