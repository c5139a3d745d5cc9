use std::collections::VecDeque;

use chess_accuracy::{AccuracyError, EngineScore, PositionEvaluator};
use shakmaty::fen::Fen;
use shakmaty::{Chess, Color, EnPassantMode};

/// Engine stand-in that replays a fixed list of White-perspective scores.
pub struct ScriptedEngine {
    scores: VecDeque<EngineScore>,
    /// FEN of every position it was asked about
    pub evaluated: Vec<String>,
    pub depths: Vec<u32>,
    pub games_started: usize,
}

impl ScriptedEngine {
    pub fn new(scores: Vec<EngineScore>) -> Self {
        Self {
            scores: scores.into(),
            evaluated: Vec::new(),
            depths: Vec::new(),
            games_started: 0,
        }
    }

    /// Script made only of centipawn scores
    pub fn centipawns(scores: &[i32]) -> Self {
        Self::new(scores.iter().map(|&cp| EngineScore::Centipawns(cp)).collect())
    }

    #[allow(dead_code)]
    pub fn remaining(&self) -> usize {
        self.scores.len()
    }
}

impl PositionEvaluator for ScriptedEngine {
    async fn new_game(&mut self) -> Result<(), AccuracyError> {
        self.games_started += 1;
        Ok(())
    }

    async fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<EngineScore, AccuracyError> {
        self.evaluated
            .push(Fen::from_position(position, EnPassantMode::Legal).to_string());
        self.depths.push(depth);
        self.scores
            .pop_front()
            .ok_or_else(|| AccuracyError::Engine("scripted engine ran out of scores".into()))
    }
}

/// Mate already delivered by `winner`
#[allow(dead_code)]
pub fn mated_by(winner: Color) -> EngineScore {
    EngineScore::Mate { moves: 0, winner }
}
