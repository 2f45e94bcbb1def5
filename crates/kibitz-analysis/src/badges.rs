//! Badge assignment: merging classifier results into per-position labels.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classify::{best_first_choice, difficulties, errors};
use crate::game::PositionWithMove;

/// Badge code for an evaluation swing.
pub const BADGE_ERROR: char = 'e';
/// Badge code for a clearly best first choice.
pub const BADGE_FIRST_CHOICE: char = 'f';
/// Badge code for a hard, fluctuating position.
pub const BADGE_HARD: char = 'h';

/// Score thresholds for the two threshold-based classifiers, in pawns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum first-choice score swing to flag an error.
    pub error: f64,
    /// Minimum first-to-last candidate spread to flag a clear best move.
    pub first_choice: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            error: 0.75,
            first_choice: 1.5,
        }
    }
}

/// Badges keyed by board identity (FEN).
///
/// A badge belongs to a position, not a ply: two plies reaching the same
/// board state by transposition share one label. Absent keys read as the
/// empty label. Built fresh per game, append-only.
#[derive(Debug, Clone, Default)]
pub struct BadgeMap {
    labels: HashMap<String, String>,
}

impl BadgeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The label for a board identity, empty for unbadged positions.
    pub fn get(&self, fen: &str) -> &str {
        self.labels.get(fen).map_or("", String::as_str)
    }

    /// The primary badge: the first character of the label.
    pub fn primary(&self, fen: &str) -> Option<char> {
        self.get(fen).chars().next()
    }

    pub(crate) fn push(&mut self, fen: &str, badge: char) {
        self.labels.entry(fen.to_string()).or_default().push(badge);
    }
}

/// Runs all three classifiers over the full per-ply sequence and merges
/// their results into a [`BadgeMap`].
///
/// The append order is fixed: `'e'` for every error position first, then
/// `'f'` for every clear-best position, then `'h'` for every fluctuating
/// one. Consumers only look at the first character of a label, so the
/// order decides which condition wins when several apply to one identity.
pub fn assign_badges(positions: &[PositionWithMove], thresholds: &Thresholds) -> BadgeMap {
    let mut badges = BadgeMap::new();
    for pos in errors(positions, thresholds.error) {
        badges.push(&pos.position.fen, BADGE_ERROR);
    }
    for pos in best_first_choice(positions, thresholds.first_choice) {
        badges.push(&pos.position.fen, BADGE_FIRST_CHOICE);
    }
    for pos in difficulties(positions) {
        badges.push(&pos.position.fen, BADGE_HARD);
    }
    badges
}
