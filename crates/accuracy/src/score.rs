//! Engine score model and mate substitution

use std::fmt;

use shakmaty::Color;

/// Centipawn value standing in for any forced mate.
pub const MATE_SCORE: i32 = 1000;

/// A position score from White's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineScore {
    Centipawns(i32),
    /// Forced mate: `moves` until mate (0 = mate already on the board)
    Mate { moves: u32, winner: Color },
}

impl EngineScore {
    /// From a UCI `score cp` value, which is relative to the side to move.
    pub fn from_relative_cp(cp: i32, turn: Color) -> Self {
        EngineScore::Centipawns(turn.fold_wb(cp, -cp))
    }

    /// From a UCI `score mate` value: positive when the side to move mates,
    /// negative or zero when it gets mated.
    pub fn from_relative_mate(mate: i32, turn: Color) -> Self {
        let winner = if mate > 0 { turn } else { !turn };
        EngineScore::Mate {
            moves: mate.unsigned_abs(),
            winner,
        }
    }

    /// Centipawn value with mates replaced by `±MATE_SCORE`.
    pub fn to_centipawns(self) -> i32 {
        match self {
            EngineScore::Centipawns(cp) => cp,
            EngineScore::Mate { winner, .. } => winner.fold_wb(MATE_SCORE, -MATE_SCORE),
        }
    }
}

impl fmt::Display for EngineScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            // Pawn units, always with a decimal point
            EngineScore::Centipawns(cp) => write!(f, "{:?}", f64::from(cp) / 100.0),
            EngineScore::Mate { moves, winner } => {
                write!(f, "Mate in {moves} for {}", winner.fold_wb("White", "Black"))
            }
        }
    }
}
