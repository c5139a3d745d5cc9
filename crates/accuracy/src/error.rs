//! Accuracy pipeline error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccuracyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("PGN error: {0}")]
    Pgn(#[from] chess_core::PgnError),

    #[error("Illegal move {san} at ply {ply}")]
    IllegalMove { san: String, ply: usize },

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
