//! Final per-side figures for a run

use std::fmt;

use serde::Serialize;

use crate::accuracy::{RunningTotals, SideTotals};
use crate::analysis::harmonic_mean;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideSummary {
    pub average_cp_loss: f64,
    pub accuracy: f64,
    pub moves: usize,
}

impl SideSummary {
    fn from_totals(totals: &SideTotals) -> Self {
        let moves = totals.moves();
        let average_cp_loss = if moves > 0 {
            totals.cp_loss as f64 / moves as f64
        } else {
            0.0
        };
        Self {
            average_cp_loss,
            accuracy: harmonic_mean(&totals.accuracies),
            moves,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameAccuracySummary {
    pub white: SideSummary,
    pub black: SideSummary,
}

impl GameAccuracySummary {
    pub fn from_totals(totals: RunningTotals) -> Self {
        Self::new(
            SideSummary::from_totals(&totals.white),
            SideSummary::from_totals(&totals.black),
        )
    }

    /// Combine both sides, capping the accuracy of whichever side lost more
    /// centipawns on average at one point below its opponent's.
    pub fn new(mut white: SideSummary, mut black: SideSummary) -> Self {
        if white.average_cp_loss < black.average_cp_loss {
            black.accuracy = black.accuracy.min(white.accuracy - 1.0);
        } else if white.average_cp_loss > black.average_cp_loss {
            white.accuracy = white.accuracy.min(black.accuracy - 1.0);
        }
        Self { white, black }
    }
}

/// `W_ACPL, W_ACC, B_ACPL, B_ACC`, each rounded to an integer.
impl fmt::Display for GameAccuracySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}, {:.0}, {:.0}, {:.0}",
            self.white.average_cp_loss,
            self.white.accuracy,
            self.black.average_cp_loss,
            self.black.accuracy
        )
    }
}
