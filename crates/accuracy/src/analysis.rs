/// Win probability and move accuracy — pure functions only
/// (No Board/Engine/Game dependencies)

/// Logistic coefficient mapping centipawns to winning chances
const WIN_PROBABILITY_COEFFICIENT: f64 = -0.00368208;

/// Exponential fit of accuracy against win-probability drop
const ACCURACY_SCALE: f64 = 103.1668100711649;
const ACCURACY_DECAY: f64 = -0.04354415386753951;
const ACCURACY_OFFSET: f64 = -3.166924740191411;

/// Win probability (0-100) for a White-perspective centipawn score.
pub fn winning_chances_percent(cp: i32) -> f64 {
    let chances = 2.0 / (1.0 + (WIN_PROBABILITY_COEFFICIENT * cp as f64).exp()) - 1.0;
    50.0 + 50.0 * chances.clamp(-1.0, 1.0)
}

/// Accuracy (0-100) of a move, from the mover's win probability before and after it.
pub fn move_accuracy_percent(before: f64, after: f64) -> f64 {
    if after >= before {
        return 100.0;
    }
    let win_diff = before - after;
    let raw = ACCURACY_SCALE * (ACCURACY_DECAY * win_diff).exp() + ACCURACY_OFFSET;
    (raw + 1.0).clamp(0.0, 100.0)
}

/// Harmonic mean of per-move accuracies.
///
/// Zero entries count towards `n` but are left out of the reciprocal sum,
/// which pulls the result upwards whenever a move scored exactly 0.
pub fn harmonic_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let reciprocal_sum: f64 = values.iter().filter(|&&v| v != 0.0).map(|v| 1.0 / v).sum();
    if reciprocal_sum != 0.0 {
        values.len() as f64 / reciprocal_sum
    } else {
        0.0
    }
}
