//! # Module Command Implementation
//!
//! Builds one Terraform module into its output directory: materializes the
//! sources, strips unwanted directories, colocates module dependencies and
//! saves the module's metadata for dependents.

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use terraform_pack::build::build_module;
use terraform_pack::config::{ModuleConfig, RegistryModule};
use terraform_pack::defaults;

use super::TargetArgs;

/// Build a Terraform module
#[derive(Args, Debug)]
pub struct ModuleArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Directory to write the module to
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Source files flattened into the output by base name
    #[arg(long, value_name = "FILE", num_args = 1.., value_delimiter = ' ')]
    pub srcs: Vec<PathBuf>,

    /// Already-fetched module tree mirrored into the output
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Registry coordinate of the module (namespace/name/provider)
    #[arg(long, value_name = "COORDINATE")]
    pub registry_source: Option<RegistryModule>,

    /// Extra locators other configuration uses to reference this module
    #[arg(long, value_name = "ALIAS", num_args = 1.., value_delimiter = ' ')]
    pub aliases: Vec<String>,

    /// Relative directories removed from the output
    #[arg(long, value_name = "DIR", num_args = 1.., value_delimiter = ' ')]
    pub strip: Vec<String>,

    /// Output directories of modules this module depends on
    #[arg(long, value_name = "DIR", num_args = 1.., value_delimiter = ' ')]
    pub deps: Vec<PathBuf>,

    /// Metadata file location relative to each module output
    #[arg(
        long,
        value_name = "PATH",
        env = "TERRAFORM_PACK_METADATA_FILE",
        default_value = defaults::MODULE_METADATA_FILE
    )]
    pub metadata_file: PathBuf,
}

impl ModuleArgs {
    fn into_config(self) -> ModuleConfig {
        let mut config = ModuleConfig::new(self.target.label(), self.out);
        config.srcs = self.srcs;
        config.source_dir = self.source_dir;
        config.registry_source = self.registry_source;
        config.aliases = self.aliases;
        config.strip = self.strip;
        config.deps = self.deps;
        config.metadata_file = self.metadata_file;
        config
    }
}

/// Execute the `module` command.
pub fn execute(args: ModuleArgs) -> Result<()> {
    let config = args.into_config();
    let metadata = build_module(&config)
        .with_context(|| format!("failed to build module {}", config.label))?;
    info!(
        target: "terraform_pack::commands",
        "built {} with aliases {:?}",
        metadata.target,
        metadata.aliases
    );
    Ok(())
}
