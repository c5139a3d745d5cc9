//! Command-line and environment configuration

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::error::AccuracyError;
use crate::stockfish::EngineOptions;

#[derive(Parser, Debug)]
#[command(
    name = "chess-accuracy",
    version,
    about = "Average centipawn loss and accuracy per side for PGN games, scored by a UCI engine"
)]
pub struct Cli {
    /// Search depth for every position
    pub depth: u32,

    /// Search threads inside the engine
    pub threads: u32,

    /// Path to the UCI engine binary
    #[arg(env = "STOCKFISH_PATH")]
    pub engine_path: String,

    /// PGN file or glob pattern; repeat to read several, all combined into one result
    #[arg(long, value_name = "PATH", conflicts_with = "pgn")]
    pub file: Vec<String>,

    /// PGN text given inline
    #[arg(long, value_name = "TEXT")]
    pub pgn: Option<String>,

    /// Print one line per analyzed move
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Engine hash table size in MB
    #[arg(long, env = "STOCKFISH_HASH_MB", default_value_t = 256)]
    pub hash: u32,
}

/// Where the PGN text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Files(Vec<PathBuf>),
    Inline(String),
    Stdin,
}

impl InputSource {
    /// Open every underlying stream, in reading order
    pub fn open(&self) -> Result<Vec<Box<dyn Read>>, AccuracyError> {
        match self {
            InputSource::Files(paths) => paths
                .iter()
                .map(|path| -> Result<Box<dyn Read>, AccuracyError> {
                    let file = File::open(path).map_err(|source| AccuracyError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    Ok(Box::new(BufReader::new(file)))
                })
                .collect(),
            InputSource::Inline(pgn) => {
                let reader: Box<dyn Read> = Box::new(Cursor::new(pgn.clone().into_bytes()));
                Ok(vec![reader])
            }
            InputSource::Stdin => {
                let reader: Box<dyn Read> = Box::new(io::stdin());
                Ok(vec![reader])
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccuracyConfig {
    pub depth: u32,
    pub engine_path: String,
    pub engine: EngineOptions,
    pub input: InputSource,
    pub verbose: bool,
    pub json: bool,
}

impl AccuracyConfig {
    /// Validate parsed arguments and resolve the input source
    pub fn from_cli(cli: Cli) -> Result<Self, AccuracyError> {
        if cli.depth == 0 {
            return Err(AccuracyError::Config("depth must be at least 1".into()));
        }
        if cli.threads == 0 {
            return Err(AccuracyError::Config("threads must be at least 1".into()));
        }
        if cli.engine_path.trim().is_empty() {
            return Err(AccuracyError::Config("engine path is empty".into()));
        }

        let input = match (cli.file.is_empty(), cli.pgn) {
            (false, Some(_)) => {
                return Err(AccuracyError::Config(
                    "--file and --pgn cannot be combined".into(),
                ))
            }
            (false, None) => InputSource::Files(expand_patterns(&cli.file)?),
            (true, Some(pgn)) => InputSource::Inline(pgn),
            (true, None) => InputSource::Stdin,
        };

        Ok(Self {
            depth: cli.depth,
            engine_path: cli.engine_path,
            engine: EngineOptions {
                threads: cli.threads,
                hash_mb: cli.hash,
            },
            input,
            verbose: cli.verbose,
            json: cli.json,
        })
    }
}

/// Expand glob patterns into concrete paths, keeping argument order
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, AccuracyError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches: Vec<PathBuf> = glob::glob(pattern)
            .map_err(|e| AccuracyError::Config(format!("Invalid pattern {pattern}: {e}")))?
            .filter_map(|p| p.ok())
            .collect();

        if matches.is_empty() {
            return Err(AccuracyError::Config(format!("No PGN files match {pattern}")));
        }
        info!(pattern = %pattern, files = matches.len(), "Resolved PGN input");
        paths.extend(matches);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<AccuracyConfig, AccuracyError> {
        let cli = Cli::try_parse_from(args.iter().copied()).expect("arguments should parse");
        AccuracyConfig::from_cli(cli)
    }

    #[test]
    fn test_positional_arguments() {
        let config = parse(&["chess-accuracy", "16", "2", "./stockfish", "--hash", "64"]).unwrap();
        assert_eq!(config.depth, 16);
        assert_eq!(config.engine.threads, 2);
        assert_eq!(config.engine.hash_mb, 64);
        assert_eq!(config.engine_path, "./stockfish");
        assert_eq!(config.input, InputSource::Stdin);
        assert!(!config.verbose);
        assert!(!config.json);
    }

    #[test]
    fn test_inline_pgn() {
        let config = parse(&[
            "chess-accuracy",
            "12",
            "1",
            "sf",
            "--pgn",
            "1.e4 e5 2.Nf3 Nc6",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.input, InputSource::Inline("1.e4 e5 2.Nf3 Nc6".into()));
        assert!(config.verbose);
    }

    #[test]
    fn test_file_and_pgn_conflict() {
        let result = Cli::try_parse_from([
            "chess-accuracy",
            "12",
            "1",
            "sf",
            "--file",
            "game.pgn",
            "--pgn",
            "1.e4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = parse(&["chess-accuracy", "0", "1", "sf"]).unwrap_err();
        assert!(matches!(err, AccuracyError::Config(_)));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = parse(&["chess-accuracy", "10", "0", "sf"]).unwrap_err();
        assert!(matches!(err, AccuracyError::Config(_)));
    }

    #[test]
    fn test_glob_expansion() {
        let pattern = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.tom?");
        let config = parse(&["chess-accuracy", "10", "1", "sf", "--file", pattern]).unwrap();
        match config.input {
            InputSource::Files(paths) => {
                assert_eq!(paths.len(), 1);
                assert!(paths[0].ends_with("Cargo.toml"));
            }
            other => panic!("expected files, got {other:?}"),
        }
    }

    #[test]
    fn test_unmatched_file_rejected() {
        let err = parse(&[
            "chess-accuracy",
            "10",
            "1",
            "sf",
            "--file",
            "/definitely/not/here/*.pgn",
        ])
        .unwrap_err();
        assert!(matches!(err, AccuracyError::Config(_)));
    }

    #[test]
    fn test_inline_source_opens() {
        let mut sources = InputSource::Inline("1. e4 *".into()).open().unwrap();
        let mut text = String::new();
        sources[0].read_to_string(&mut text).unwrap();
        assert_eq!(text, "1. e4 *");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let missing = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/no-such-game.pgn"));
        let err = InputSource::Files(vec![missing.clone()]).open().err().unwrap();
        match err {
            AccuracyError::Io { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected I/O error, got {other:?}"),
        }
    }
}
