//! # Workspace Command Implementation
//!
//! Prepares a runnable copy of a built root module and prints a shell
//! snippet that puts Terraform on `PATH`, sets `GIT_DIR` and changes into the
//! workspace. Meant to be evaluated by the calling shell:
//!
//! ```bash
//! eval "$(terraform-pack workspace --terraform-binary ... --root-module ...)"
//! ```
//!
//! Logs go to stderr so stdout holds only the snippet.

use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;

use terraform_pack::config::WorkspaceConfig;
use terraform_pack::defaults;
use terraform_pack::path::repo_root_from;
use terraform_pack::workspace::prepare_workspace;

/// Prepare a runnable Terraform workspace
#[derive(Args, Debug)]
pub struct WorkspaceArgs {
    /// Terraform binary to put on PATH
    #[arg(long, value_name = "PATH")]
    pub terraform_binary: PathBuf,

    /// Built root module, relative to the repository root
    #[arg(long, value_name = "DIR")]
    pub root_module: PathBuf,

    /// Directory workspaces are created under, relative to the repository root
    #[arg(
        long,
        value_name = "DIR",
        env = "TERRAFORM_PACK_WORKSPACE_DIR",
        default_value = defaults::WORKSPACE_BASE_DIR
    )]
    pub base_dir: PathBuf,

    /// Build output directory name, relative to the repository root
    #[arg(
        long,
        value_name = "DIR",
        env = "TERRAFORM_PACK_PLZ_OUT_DIR",
        default_value = defaults::PLZ_OUT_DIR
    )]
    pub plz_out_dir: String,

    /// Additional patterns of workspace paths preserved between runs
    #[arg(long, value_name = "REGEX")]
    pub keep: Vec<String>,
}

/// Execute the `workspace` command.
pub fn execute(args: WorkspaceArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("could not determine current directory")?;
    let plz_out_dir = args.plz_out_dir.trim_end_matches('/').to_string();

    let mut keep_patterns = defaults::workspace_keep_patterns();
    keep_patterns.extend(args.keep);

    let config = WorkspaceConfig {
        repo_root: repo_root_from(&cwd, &plz_out_dir),
        terraform_binary: args.terraform_binary,
        root_module: args.root_module,
        base_dir: args.base_dir,
        plz_out_dir,
        keep_patterns,
    };

    let workspace = prepare_workspace(&config).with_context(|| {
        format!(
            "failed to prepare workspace for '{}'",
            config.root_module.display()
        )
    })?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(workspace.shell_snippet().as_bytes())?;
    stdout.flush()?;
    Ok(())
}
