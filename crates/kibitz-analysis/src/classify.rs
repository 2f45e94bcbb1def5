//! Interest classification over the per-ply sequence.
//!
//! Three independent, pure passes: evaluation swings between consecutive
//! plies, positions with fluctuating candidate scores, and positions with
//! one clearly best move. Each returns the matching subsequence in
//! original order.

use crate::game::{Position, PositionWithMove};

/// Flags plies where the engine's first-choice score swings by at least
/// `threshold` pawns between one position and the next.
///
/// The sequence is viewed as overlapping adjacent pairs; on a match the
/// earlier member of the pair is selected. The comparison uses first-choice
/// scores only, not the move actually played, so a detected "error" is
/// attributed to the swing between best lines.
pub fn errors(positions: &[PositionWithMove], threshold: f64) -> Vec<&PositionWithMove> {
    positions
        .windows(2)
        .filter_map(|pair| {
            let before = first_choice_score(&pair[0].position)?;
            let after = first_choice_score(&pair[1].position)?;
            ((after - before).abs() >= threshold).then_some(&pair[0])
        })
        .collect()
}

/// Flags positions whose candidate evaluations disagree about who is
/// better: the distinct signs of the scores span more than one value.
///
/// A position with no candidates has no signs and is never flagged.
pub fn difficulties(positions: &[PositionWithMove]) -> Vec<&PositionWithMove> {
    positions
        .iter()
        .filter(|pos| fluctuates(&pos.position))
        .collect()
}

/// Flags positions where the first-ranked candidate beats the last-ranked
/// one by at least `threshold` pawns.
///
/// Positions with zero or one candidate have a difference of zero.
pub fn best_first_choice(positions: &[PositionWithMove], threshold: f64) -> Vec<&PositionWithMove> {
    positions
        .iter()
        .filter(|pos| first_to_last_spread(&pos.position) >= threshold)
        .collect()
}

fn first_choice_score(position: &Position) -> Option<f64> {
    position.evaluations.first().map(|ev| ev.score)
}

fn fluctuates(position: &Position) -> bool {
    let mut seen = [false; 3];
    for ev in &position.evaluations {
        seen[(sign(ev.score) + 1) as usize] = true;
    }
    seen.iter().filter(|&&s| s).count() > 1
}

fn first_to_last_spread(position: &Position) -> f64 {
    match (position.evaluations.first(), position.evaluations.last()) {
        (Some(first), Some(last)) => (first.score - last.score).abs(),
        _ => 0.0,
    }
}

/// Sign of a score as -1, 0, or +1. Not `f64::signum`, which maps 0.0
/// to 1.0.
fn sign(score: f64) -> i8 {
    if score > 0.0 {
        1
    } else if score < 0.0 {
        -1
    } else {
        0
    }
}
