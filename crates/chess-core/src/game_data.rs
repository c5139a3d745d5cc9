use pgn_reader::SanPlus;
use serde::{Deserialize, Serialize};
use shakmaty::Chess;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub white: Option<String>,
    pub black: Option<String>,
    pub event: Option<String>,
    pub result: Option<String>, // "1-0", "0-1", "1/2-1/2", "*"
}

/// The principal line of one recorded game.
///
/// Only the main line is kept: alternative variations in the source text are
/// never visited, so `moves` is a plain ordered sequence with no branching.
#[derive(Debug, Clone)]
pub struct MainLine {
    pub metadata: GameMetadata,
    /// Position before the first move (standard start unless a `FEN` tag says otherwise).
    pub start: Chess,
    pub moves: Vec<SanPlus>,
}

impl MainLine {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }
}
