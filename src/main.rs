//! # Terraform Pack CLI
//!
//! This is the binary entry point for the `terraform-pack` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Installing the logger at the requested level.
//! - Executing the appropriate build step and reporting failures with a
//!   non-zero exit code.
//!
//! The build logic lives in the `terraform_pack` library; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
