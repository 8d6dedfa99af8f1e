//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Terraform Pack - Package Terraform modules and providers as build artifacts
#[derive(Parser, Debug)]
#[command(name = "terraform-pack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        env = "TERRAFORM_PACK_LOG_LEVEL"
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a Terraform module into an output directory
    Module(commands::module::ModuleArgs),

    /// Build a provider plugin into a filesystem mirror layout
    Provider(commands::provider::ProviderArgs),

    /// Assemble a Terraform root module
    Root(commands::root::RootArgs),

    /// Prepare a runnable workspace and print a shell snippet entering it
    Workspace(commands::workspace::WorkspaceArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Module(args) => commands::module::execute(args),
            Commands::Provider(args) => commands::provider::execute(args),
            Commands::Root(args) => commands::root::execute(args),
            Commands::Workspace(args) => commands::workspace::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Install the stderr logger. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_log_level() {
        let cli = Cli::try_parse_from(["terraform-pack", "completions", "bash"]).unwrap();
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["terraform-pack", "apply"]).is_err());
    }
}
