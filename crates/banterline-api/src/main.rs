//! Banterline console entry point.
//!
//! Binary name: `bline`
//!
//! Parses CLI arguments, initializes logging and configuration, then
//! dispatches to the chat REPL or an administrative command.

mod cli;

use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Map verbosity to a default filter; RUST_LOG still wins.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,banterline=debug",
        _ => "trace",
    };
    banterline_observe::init_tracing(filter, cli.json_logs)
        .map_err(|e| anyhow::anyhow!("failed to init tracing: {e}"))?;

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(banterline_infra::config::default_data_dir);
    let config = banterline_infra::config::load_config(&data_dir).await;

    match cli.command {
        Commands::Chat { user } => cli::chat::run(config, &data_dir, user).await,
        Commands::Wipe { participant } => cli::wipe::run(config, &data_dir, participant).await,
        Commands::Stats => cli::stats::run(config, &data_dir).await,
    }
}
