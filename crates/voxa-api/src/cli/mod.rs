//! CLI command definitions for the `voxa` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod listen;
pub mod render;
pub mod say;
pub mod skills;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Talk to the Voxa voice assistant from a terminal.
#[derive(Parser)]
#[command(name = "voxa", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive session; every line is one utterance.
    Chat,

    /// Interpret a single utterance and exit.
    Say {
        /// The utterance, e.g. `voxa say поставь таймер на 5 минут`.
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
    },

    /// Read utterances from stdin, one per line, as final speech events.
    Listen,

    /// List registered skills.
    Skills,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_say_collects_words() {
        let cli = Cli::try_parse_from(["voxa", "--json", "say", "который", "час"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Say { utterance } => assert_eq!(utterance.join(" "), "который час"),
            _ => panic!("expected say"),
        }
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["voxa", "-vv", "skills"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Skills));
    }

    #[test]
    fn test_say_requires_words() {
        assert!(Cli::try_parse_from(["voxa", "say"]).is_err());
    }
}
