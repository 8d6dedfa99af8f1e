//! `terraform-pack completions <shell>`
//!
//! Prints a completion script for the whole command tree, so the long build
//! rule flags (`--srcs`, `--deps`, `--registry-source`, `--metadata-file`) can
//! be tab-completed when running the tool by hand outside the build.
//!
//! ```bash
//! terraform-pack completions bash > ~/.local/share/bash-completion/completions/terraform-pack
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

use crate::cli::Cli;

const BIN_NAME: &str = "terraform-pack";

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout())
}

fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    out.flush()?;
    Ok(())
}
