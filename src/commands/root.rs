//! # Root Command Implementation
//!
//! Assembles a Terraform root module: flattens its sources, substitutes the
//! `$PKG_DIR`, `$PKG`, `$NAME`, `$ARCH` and `$OS` placeholders, adds
//! auto-loaded variable files, colocates modules and installs provider
//! mirrors into `terraform.d/plugins`.

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use terraform_pack::build::build_root;
use terraform_pack::config::RootConfig;
use terraform_pack::defaults;

use super::TargetArgs;

/// Assemble a Terraform root module
#[derive(Args, Debug)]
pub struct RootArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Package directory substituted for `$PKG_DIR`
    #[arg(long, value_name = "DIR")]
    pub pkg_dir: String,

    /// Operating system substituted for `$OS`
    #[arg(long, value_name = "OS", default_value = std::env::consts::OS)]
    pub os: String,

    /// Architecture substituted for `$ARCH`
    #[arg(long, value_name = "ARCH", default_value = std::env::consts::ARCH)]
    pub arch: String,

    /// Directory to write the root module to
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Source files flattened into the output by base name
    #[arg(long, value_name = "FILE", num_args = 1.., value_delimiter = ' ')]
    pub srcs: Vec<PathBuf>,

    /// Variable files loaded automatically, in order
    #[arg(long, value_name = "FILE", num_args = 1.., value_delimiter = ' ')]
    pub var_files: Vec<PathBuf>,

    /// Output directories of modules the root module uses
    #[arg(long, value_name = "DIR", num_args = 1.., value_delimiter = ' ')]
    pub modules: Vec<PathBuf>,

    /// Output directories of provider mirrors to install
    #[arg(long, value_name = "DIR", num_args = 1.., value_delimiter = ' ')]
    pub providers: Vec<PathBuf>,

    /// Metadata file location relative to each module output
    #[arg(
        long,
        value_name = "PATH",
        env = "TERRAFORM_PACK_METADATA_FILE",
        default_value = defaults::MODULE_METADATA_FILE
    )]
    pub metadata_file: PathBuf,

    /// Metadata file location relative to each provider output
    #[arg(
        long,
        value_name = "PATH",
        env = "TERRAFORM_PACK_PROVIDER_METADATA_FILE",
        default_value = defaults::PROVIDER_METADATA_FILE
    )]
    pub provider_metadata_file: PathBuf,
}

impl RootArgs {
    fn into_config(self) -> RootConfig {
        RootConfig {
            label: self.target.label(),
            pkg_dir: self.pkg_dir,
            os: self.os,
            arch: self.arch,
            out: self.out,
            srcs: self.srcs,
            var_files: self.var_files,
            modules: self.modules,
            providers: self.providers,
            metadata_file: self.metadata_file,
            provider_metadata_file: self.provider_metadata_file,
        }
    }
}

/// Execute the `root` command.
pub fn execute(args: RootArgs) -> Result<()> {
    let config = args.into_config();
    let report = build_root(&config)
        .with_context(|| format!("failed to build root module {}", config.label))?;
    info!(
        target: "terraform_pack::commands",
        "built {} with {} module(s), {} reference(s) rewritten",
        config.label,
        report.dependencies.len(),
        report.rewrite.replacements
    );
    Ok(())
}
