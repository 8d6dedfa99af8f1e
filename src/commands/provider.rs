//! # Provider Command Implementation
//!
//! Mirrors a fetched provider plugin directory into the
//! `host/namespace/type/version/os_arch` layout Terraform reads from a
//! filesystem mirror, and saves the provider's metadata.

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use terraform_pack::build::build_provider;
use terraform_pack::config::ProviderConfig;
use terraform_pack::defaults;

use super::TargetArgs;

/// Build a provider plugin mirror
#[derive(Args, Debug)]
pub struct ProviderArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Directory to write the mirror to
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Directory holding the fetched plugin
    #[arg(long, value_name = "DIR")]
    pub source_dir: PathBuf,

    /// Registry the provider comes from
    #[arg(long, value_name = "URL", default_value = "registry.terraform.io")]
    pub registry: String,

    /// Provider namespace
    #[arg(long, value_name = "NAMESPACE")]
    pub namespace: String,

    /// Provider type
    #[arg(long = "type", value_name = "TYPE")]
    pub provider_type: String,

    /// Provider version
    #[arg(long, value_name = "VERSION")]
    pub provider_version: String,

    /// Target operating system
    #[arg(long, value_name = "OS")]
    pub os: String,

    /// Target architecture
    #[arg(long, value_name = "ARCH")]
    pub arch: String,

    /// Extra locators naming this provider
    #[arg(long, value_name = "ALIAS", num_args = 1.., value_delimiter = ' ')]
    pub aliases: Vec<String>,

    /// Metadata file location relative to each provider output
    #[arg(
        long,
        value_name = "PATH",
        env = "TERRAFORM_PACK_PROVIDER_METADATA_FILE",
        default_value = defaults::PROVIDER_METADATA_FILE
    )]
    pub metadata_file: PathBuf,
}

impl ProviderArgs {
    fn into_config(self) -> ProviderConfig {
        ProviderConfig {
            label: self.target.label(),
            out: self.out,
            source_dir: self.source_dir,
            registry: self.registry,
            namespace: self.namespace,
            provider_type: self.provider_type,
            version: self.provider_version,
            os: self.os,
            arch: self.arch,
            aliases: self.aliases,
            metadata_file: self.metadata_file,
        }
    }
}

/// Execute the `provider` command.
pub fn execute(args: ProviderArgs) -> Result<()> {
    let config = args.into_config();
    build_provider(&config)
        .with_context(|| format!("failed to build provider {}", config.label))?;
    info!(
        target: "terraform_pack::commands",
        "built provider {} at '{}'",
        config.label,
        config.mirror_layout().display()
    );
    Ok(())
}
