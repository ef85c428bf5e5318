//! Shell completions command handler

use crate::cli::{Cli, CompletionsArgs, Shell};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use clap::CommandFactory;

/// Handle the completions command
pub fn handle_completions(args: CompletionsArgs, output: &mut OutputWriter) -> Result<()> {
    let script = completion_script(args.shell)?;
    output.write(&script)
}

/// Render the completion script for `shell`
fn completion_script(shell: Shell) -> Result<String> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    let mut buffer = Vec::new();
    clap_complete::generate(shell.to_clap_shell(), &mut cmd, name, &mut buffer);
    String::from_utf8(buffer)
        .map_err(|e| Error::other(format!("Completion script is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_names_subcommands() {
        let script = completion_script(Shell::Bash).unwrap();
        assert!(script.contains("datatype"));
        assert!(script.contains("validate"));
        assert!(script.contains("completions"));
    }

    #[test]
    fn test_every_shell_renders() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!completion_script(shell).unwrap().is_empty());
        }
    }
}
