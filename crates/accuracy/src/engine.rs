//! Contract between the evaluation loop and whatever scores positions

use shakmaty::Chess;

use crate::error::AccuracyError;
use crate::score::EngineScore;

/// Scores positions on request, one at a time.
///
/// The loop awaits every call before moving on, so implementations never
/// see more than one outstanding request. Any error is fatal to the run.
#[allow(async_fn_in_trait)]
pub trait PositionEvaluator {
    /// Called before the first move of each game.
    async fn new_game(&mut self) -> Result<(), AccuracyError> {
        Ok(())
    }

    /// Score `position` (from White's perspective) searching to `depth` plies.
    async fn evaluate(&mut self, position: &Chess, depth: u32)
        -> Result<EngineScore, AccuracyError>;
}
