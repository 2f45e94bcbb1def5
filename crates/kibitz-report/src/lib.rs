//! HTML report rendering for analyzed games.
//!
//! Consumes the per-ply sequence (full or summary view), the badge map,
//! and the game headers, and produces a standalone HTML document with an
//! inline SVG diagram per shown position.

mod svg;

pub use svg::board_svg;

use askama::Template;
use kibitz_analysis::{BadgeMap, PositionWithMove};
use thiserror::Error;

/// Diagram edge length in pixels.
const DIAGRAM_SIZE: u32 = 400;

/// Errors that can occur while rendering a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Template rendering failed.
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
    /// A position carried a FEN the diagram renderer couldn't draw.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
}

#[derive(Template)]
#[template(path = "game.html")]
struct GameTemplate<'a> {
    title: String,
    headers: &'a [(String, String)],
    diagrams: Vec<Diagram>,
}

/// One shown position, fully stringified for the template.
struct Diagram {
    svg: String,
    /// Primary badge character, empty for unbadged positions (summary
    /// views never contain those outside error lookaheads).
    badge: String,
    badge_label: &'static str,
    /// SAN of the move played, empty for the terminal record.
    move_played: String,
    /// Ranked engine lines, best first, e.g. "+0.55 Nc3".
    lines: Vec<String>,
}

/// Renders a game to a standalone HTML document.
///
/// `positions` is either the full per-ply sequence or the summary
/// subsequence; the renderer does not filter.
pub fn render_game(
    headers: &[(String, String)],
    positions: &[&PositionWithMove],
    badges: &BadgeMap,
) -> Result<String, ReportError> {
    let diagrams = positions
        .iter()
        .map(|pos| diagram(pos, badges))
        .collect::<Result<Vec<_>, _>>()?;

    let template = GameTemplate {
        title: title(headers),
        headers,
        diagrams,
    };
    Ok(template.render()?)
}

fn diagram(pos: &PositionWithMove, badges: &BadgeMap) -> Result<Diagram, ReportError> {
    let primary = badges.primary(&pos.position.fen);
    let lines = pos
        .position
        .evaluations
        .iter()
        .map(|ev| match &ev.best.san {
            Some(san) => format!("{:+.2} {}", ev.score, san),
            None => format!("{:+.2}", ev.score),
        })
        .collect();

    Ok(Diagram {
        svg: board_svg(&pos.position.fen, DIAGRAM_SIZE)?,
        badge: primary.map(String::from).unwrap_or_default(),
        badge_label: primary.map(badge_label).unwrap_or(""),
        move_played: pos.move_played.san.clone().unwrap_or_default(),
        lines,
    })
}

fn title(headers: &[(String, String)]) -> String {
    let header = |key: &str| {
        headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    match (header("White"), header("Black")) {
        (Some(white), Some(black)) => format!("{} \u{2013} {}", white, black),
        _ => "Game analysis".to_string(),
    }
}

/// Human-readable description of a primary badge character.
fn badge_label(badge: char) -> &'static str {
    match badge {
        'e' => "Evaluation swing",
        'f' => "Clear best move",
        'h' => "Difficult position",
        _ => "",
    }
}
