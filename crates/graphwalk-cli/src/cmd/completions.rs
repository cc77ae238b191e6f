//! `gw completions`: shell completion scripts.

use std::io::Write;

use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `gw completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to `out`.
pub fn run_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) {
    generate(shell, command, "gw", out);
}
