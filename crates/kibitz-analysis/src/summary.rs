//! Stateful reduction of a full game to its badge-bearing positions.

use crate::badges::{BadgeMap, BADGE_ERROR};
use crate::game::PositionWithMove;

/// Filters the full per-ply sequence down to the summary view.
///
/// A single forward pass with an explicit cursor, not a predicate filter:
/// badged positions are kept, and when a kept badge starts with `'e'` the
/// immediately following position is kept too, unconditionally, to show
/// the move that answered the flagged error. That extra pull advances the
/// cursor past the pulled element, so it is never re-examined; at the end
/// of the sequence the pull is a no-op.
pub fn summary<'a>(
    positions: &'a [PositionWithMove],
    badges: &BadgeMap,
) -> Vec<&'a PositionWithMove> {
    let mut kept = Vec::new();
    let mut cursor = 0;

    while cursor < positions.len() {
        let pos = &positions[cursor];
        cursor += 1;

        let badge = badges.get(&pos.position.fen);
        if badge.is_empty() {
            continue;
        }
        kept.push(pos);

        if badge.starts_with(BADGE_ERROR) {
            if let Some(next) = positions.get(cursor) {
                kept.push(next);
                cursor += 1;
            }
        }
    }

    kept
}
