pub use chess_core;

pub mod accuracy;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod score;
pub mod stockfish;
pub mod summary;

pub use accuracy::{analyze_games, AccuracyRun, MoveRecord, RunningTotals, SideTotals};
pub use engine::PositionEvaluator;
pub use error::AccuracyError;
pub use score::EngineScore;
pub use summary::{GameAccuracySummary, SideSummary};
