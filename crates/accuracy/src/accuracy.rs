//! Evaluation loop: walks main lines, scores every position and keeps
//! running per-side centipawn loss and accuracy totals.

use std::fmt;

use chess_core::{MainLine, PgnError};
use shakmaty::{Color, Position};
use tracing::{debug, info, warn};

use crate::analysis::{move_accuracy_percent, winning_chances_percent};
use crate::engine::PositionEvaluator;
use crate::error::AccuracyError;
use crate::score::EngineScore;
use crate::summary::GameAccuracySummary;

/// Evaluation assumed before the first move of a run (a balanced opening
/// slightly favours White).
pub const INITIAL_EVALUATION: i32 = 17;

/// One analyzed move, attributed to the side that played it
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    pub move_number: u32,
    pub mover: Color,
    /// SAN including check/mate suffix
    pub san: String,
    /// White-perspective centipawns before and after the move
    pub eval_before: i32,
    pub eval_after: i32,
    /// Engine score after the move, before mate substitution
    pub score: EngineScore,
    pub cp_loss: i32,
    pub accuracy: f64,
}

/// Verbose diagnostic line for a single move.
impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} {}, Eval: {}, Centipawn Loss: {}, Accuracy: {:.0}",
            self.move_number,
            self.mover.fold_wb("White", "Black"),
            self.san,
            self.score,
            self.cp_loss,
            self.accuracy
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideTotals {
    pub cp_loss: i64,
    /// Per-move accuracies in play order
    pub accuracies: Vec<f64>,
}

impl SideTotals {
    pub fn moves(&self) -> usize {
        self.accuracies.len()
    }

    fn record(&mut self, cp_loss: i32, accuracy: f64) {
        self.cp_loss += i64::from(cp_loss);
        self.accuracies.push(accuracy);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningTotals {
    pub white: SideTotals,
    pub black: SideTotals,
}

impl RunningTotals {
    pub fn side(&self, color: Color) -> &SideTotals {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn side_mut(&mut self, color: Color) -> &mut SideTotals {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }
}

/// Accumulator for one run. Games are folded in one after another and
/// nothing is reset between them.
#[derive(Debug, Clone)]
pub struct AccuracyRun {
    prev_evaluation: i32,
    move_number: u32,
    games: usize,
    totals: RunningTotals,
}

impl Default for AccuracyRun {
    fn default() -> Self {
        Self::new()
    }
}

impl AccuracyRun {
    pub fn new() -> Self {
        Self {
            prev_evaluation: INITIAL_EVALUATION,
            move_number: 1,
            games: 0,
            totals: RunningTotals::default(),
        }
    }

    pub fn totals(&self) -> &RunningTotals {
        &self.totals
    }

    pub fn games(&self) -> usize {
        self.games
    }

    /// Fold the engine's verdict on a just-played move into the totals.
    pub fn record_move(&mut self, mover: Color, san: String, score: EngineScore) -> MoveRecord {
        let eval_before = self.prev_evaluation;
        let eval_after = score.to_centipawns();

        let mut win_before = winning_chances_percent(eval_before);
        let mut win_after = winning_chances_percent(eval_after);
        if mover == Color::Black {
            win_before = 100.0 - win_before;
            win_after = 100.0 - win_after;
        }
        let accuracy = move_accuracy_percent(win_before, win_after);

        let cp_loss = match mover {
            Color::White if eval_after > eval_before => 0,
            Color::White => eval_before - eval_after,
            Color::Black if eval_after < eval_before => 0,
            Color::Black => eval_after - eval_before,
        };

        self.totals.side_mut(mover).record(cp_loss, accuracy);

        let record = MoveRecord {
            move_number: self.move_number,
            mover,
            san,
            eval_before,
            eval_after,
            score,
            cp_loss,
            accuracy,
        };

        self.prev_evaluation = eval_after;
        if mover == Color::Black {
            self.move_number += 1;
        }
        record
    }

    /// Replay one game's main line, asking `engine` to score each new position.
    pub async fn process_game<E, F>(
        &mut self,
        engine: &mut E,
        game: &MainLine,
        depth: u32,
        on_move: &mut F,
    ) -> Result<(), AccuracyError>
    where
        E: PositionEvaluator,
        F: FnMut(&MoveRecord),
    {
        self.games += 1;
        info!(
            game = self.games,
            moves = game.len(),
            white = game.metadata.white.as_deref().unwrap_or("?"),
            black = game.metadata.black.as_deref().unwrap_or("?"),
            "Analyzing game"
        );

        engine.new_game().await?;

        let mut position = game.start.clone();
        for (i, san_plus) in game.moves.iter().enumerate() {
            let san = san_plus.to_string();
            let illegal = || AccuracyError::IllegalMove {
                san: san.clone(),
                ply: i + 1,
            };

            let mover = position.turn();
            let mv = san_plus.san.to_move(&position).map_err(|_| illegal())?;
            position = position.play(mv).map_err(|_| illegal())?;

            let score = engine.evaluate(&position, depth).await?;
            let record = self.record_move(mover, san, score);
            debug!(%record, "Move analyzed");
            on_move(&record);
        }

        Ok(())
    }

    /// Hand the totals off to the aggregator.
    pub fn finish(self) -> GameAccuracySummary {
        GameAccuracySummary::from_totals(self.totals)
    }
}

/// Run every game from `games` through one fresh accumulator.
///
/// Any failure aborts the whole run and the partial totals are dropped.
pub async fn analyze_games<I, E, F>(
    games: I,
    engine: &mut E,
    depth: u32,
    mut on_move: F,
) -> Result<GameAccuracySummary, AccuracyError>
where
    I: IntoIterator<Item = Result<MainLine, PgnError>>,
    E: PositionEvaluator,
    F: FnMut(&MoveRecord),
{
    let mut run = AccuracyRun::new();
    for game in games {
        run.process_game(engine, &game?, depth, &mut on_move).await?;
    }

    if run.games() == 0 {
        warn!("No games found in input");
    }
    info!(
        games = run.games(),
        white_moves = run.totals().white.moves(),
        black_moves = run.totals().black.moves(),
        "Run complete"
    );
    Ok(run.finish())
}
