//! Jarvis terminal chat entry point.
//!
//! Binary name: `jarvis`
//!
//! Parses CLI arguments, sets up tracing, loads configuration and
//! dispatches to the chat loop or a one-shot command.

mod cli;
mod config;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::{AppState, Overrides};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,jarvis_core=debug",
        _ => "trace",
    };
    jarvis_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "jarvis", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    jarvis_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat {
            model,
            theme,
            seed,
            failure_rate,
        } => {
            let state = AppState::init(Overrides {
                model,
                theme,
                seed,
                failure_rate,
            })
            .await?;
            cli::chat::loop_runner::run_chat_loop(state, cli.json, cli.quiet).await?;
        }

        Commands::Models => {
            let state = AppState::init(Overrides::default()).await?;
            cli::models::list_models(&state.preferences.models, cli.json)?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
