//! game-parser CLI - flatten a directory of raw CS2 games and announce the batch
//!
//! Settings come from the environment, optionally seeded from `--env-file`.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cs2_game_parser::{process_games, CompletionEvent, NatsClient, PipelineError, Settings};

#[derive(Parser)]
#[command(name = "game-parser")]
#[command(version, about = "Flatten raw CS2 games and announce the finished batch over NATS", long_about = None)]
struct Cli {
    /// Dotenv file with settings; variables already in the environment win
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.env_file)?;

    // RUST_LOG overrides APP_LOG_LEVEL when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let nats = NatsClient::connect(settings.nats_config()).await?;

    let outcome = run(&nats, &settings).await;
    nats.close().await;

    if let Err(e) = &outcome {
        tracing::error!("Batch failed: {}", e);
    }
    outcome
}

async fn run(nats: &NatsClient, settings: &Settings) -> Result<(), PipelineError> {
    // Games are processed sequentially on this thread while the runtime keeps
    // the NATS connection alive on its workers.
    let parsed_games = tokio::task::block_in_place(|| process_games(settings))?;
    tracing::info!("Parsed {} games.", parsed_games.len());

    nats.publish_event(&CompletionEvent::new(&settings.nats_subject))
        .await?;

    Ok(())
}
