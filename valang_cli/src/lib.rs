//! # Valang command line
//!
//! Checks rule files, translates them to client-side validators and applies
//! them to JSON targets.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "valang")]
#[command(version)]
#[command(about = "Compile, translate and apply Valang validation rules")]
pub struct Cli {
    /// Log compiler and validator events down to debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a rules file and list its rules
    Check { rules: PathBuf },

    /// Print the JavaScript validator for a rules file
    Translate {
        rules: PathBuf,
        /// Name of the generated validator
        #[arg(short, long)]
        name: Option<String>,
        /// Install the validator on the form when it loads
        #[arg(long)]
        install: bool,
        /// TOML file mapping error keys to messages
        #[arg(short, long)]
        messages: Option<PathBuf>,
    },

    /// Validate a JSON target and print the binding errors
    Validate {
        rules: PathBuf,
        target: PathBuf,
        /// Comma-separated roles granted to the caller
        #[arg(short, long, value_delimiter = ',')]
        roles: Vec<String>,
        /// Default index for `[]` path segments
        #[arg(short, long)]
        index: Option<usize>,
    },
}

/// Exit code when `validate` reported errors
pub const EXIT_REJECTED: u8 = 2;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validate_arguments() {
        let cli = Cli::try_parse_from([
            "valang", "validate", "rules.val", "target.json", "--roles", "ROLE_A,ROLE_B", "-i", "2",
        ])
        .unwrap();

        match cli.command {
            Command::Validate { roles, index, .. } => {
                assert_eq!(roles, vec!["ROLE_A", "ROLE_B"]);
                assert_eq!(index, Some(2));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["valang", "check", "rules.val", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
