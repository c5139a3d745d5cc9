//! Chess accuracy CLI
//!
//! Scores every move of the given PGN games with a UCI engine and prints
//! average centipawn loss and accuracy for White and Black.

use clap::Parser;
use tracing::info;

use chess_accuracy::chess_core::MainLineReader;
use chess_accuracy::config::{AccuracyConfig, Cli};
use chess_accuracy::stockfish::StockfishEngine;
use chess_accuracy::{analyze_games, MoveRecord};

const SUMMARY_HEADER: &str = "Average centipawn loss (White), Accuracy harmonic mean (White), \
                              Average centipawn loss (Black), Accuracy harmonic mean (Black):";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries the result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = AccuracyConfig::from_cli(Cli::parse())?;
    info!(
        engine = %config.engine_path,
        depth = config.depth,
        threads = config.engine.threads,
        "Config loaded"
    );

    let sources = config.input.open()?;
    let mut engine = StockfishEngine::new(&config.engine_path, &config.engine).await?;

    let verbose = config.verbose;
    let games = sources.into_iter().flat_map(MainLineReader::new);
    let result = analyze_games(games, &mut engine, config.depth, |record: &MoveRecord| {
        if verbose {
            println!("{record}");
        }
    })
    .await;

    engine.quit().await;
    let summary = result?;

    if config.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        if verbose {
            println!("{SUMMARY_HEADER}");
        }
        println!("{summary}");
    }

    Ok(())
}
