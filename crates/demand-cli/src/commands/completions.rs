use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::aot::{generate, Shell};

use crate::cli::Cli;
use crate::error::CliError;

const BIN_NAME: &str = "demand";

/// Write the completion script for `shell`, or for the shell in `$SHELL`.
pub fn run_completions(shell: Option<Shell>, output_path: Option<&Path>) -> Result<(), CliError> {
    let shell = resolve_shell(shell)?;
    let script = render_completions(shell);

    match output_path {
        Some(path) => {
            std::fs::write(path, &script)?;
            eprintln!("Wrote {shell} completions to {}", path.display());
        }
        None => io::stdout().write_all(&script)?,
    }
    Ok(())
}

fn resolve_shell(explicit: Option<Shell>) -> Result<Shell, CliError> {
    explicit.or_else(Shell::from_env).ok_or_else(|| {
        CliError::Config(
            "Could not detect the shell from $SHELL; pass one of bash, zsh, fish, elvish, powershell"
                .to_string(),
        )
    })
}

/// Completion script covering subcommands, flags and the priority and
/// category values accepted by `submit`.
pub fn render_completions(shell: Shell) -> Vec<u8> {
    let mut script = Vec::new();
    generate(shell, &mut Cli::command(), BIN_NAME, &mut script);
    script
}
