//! Voxa CLI entry point.
//!
//! Binary name: `voxa`
//!
//! Parses CLI arguments, initializes tracing and the assistant state, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use std::sync::Arc;

use clap::Parser;
use clap_complete::generate;

use voxa_infra::speech::ConsoleSpeech;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,voxa_core=debug,voxa_infra=debug",
        _ => "trace",
    };
    voxa_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "voxa", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    voxa_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // The chat loop owns the terminal and builds its own state.
    if let Commands::Chat = cli.command {
        return cli::chat::loop_runner::run_chat_loop().await;
    }

    let speech = if cli.json || cli.quiet {
        ConsoleSpeech::silent()
    } else {
        ConsoleSpeech::stdout()
    };
    let state = AppState::init(Arc::new(speech)).await?;

    let result = match cli.command {
        Commands::Say { utterance } => cli::say::say(&state, &utterance.join(" "), cli.json).await,
        Commands::Listen => cli::listen::run_listen(&state, cli.json).await,
        Commands::Skills => cli::skills::list_skills(&state, cli.json),
        Commands::Chat | Commands::Completions { .. } => Ok(()),
    };

    state.shutdown().await;
    result
}
