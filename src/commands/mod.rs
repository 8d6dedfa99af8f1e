//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `terraform-pack` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, builds the matching
//!   library configuration and runs the build step.
//!
//! List-valued options accept several values per flag, separated by spaces,
//! so a build rule can pass `--srcs $SRCS` unquoted or quoted.

use clap::Args;

use terraform_pack::metadata::Label;

pub mod completions;
pub mod module;
pub mod provider;
pub mod root;
pub mod workspace;

/// Identity of the artifact being built
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Package of the build target
    #[arg(long, value_name = "PACKAGE")]
    pub pkg: String,

    /// Name of the build target
    #[arg(long, value_name = "NAME")]
    pub name: String,
}

impl TargetArgs {
    pub fn label(&self) -> Label {
        Label::new(&self.pkg, &self.name)
    }
}
