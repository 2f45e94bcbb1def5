//! Inline SVG board diagrams.

use std::fmt::Write;

use crate::ReportError;

const LIGHT_SQUARE: &str = "#f0d9b5";
const DARK_SQUARE: &str = "#b58863";

/// Renders the piece-placement field of a FEN as a square SVG diagram
/// without coordinates, White at the bottom.
///
/// # Errors
///
/// [`ReportError::InvalidFen`] when the placement field is missing,
/// malformed, or contains an unknown piece letter.
pub fn board_svg(fen: &str, size: u32) -> Result<String, ReportError> {
    let placement = fen
        .split_whitespace()
        .next()
        .ok_or_else(|| ReportError::InvalidFen(fen.to_string()))?;

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(ReportError::InvalidFen(fen.to_string()));
    }

    let square = size / 8;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {size} {size}" width="{size}" height="{size}">"#
    );

    for rank in 0..8u32 {
        for file in 0..8u32 {
            let fill = if (rank + file) % 2 == 0 {
                LIGHT_SQUARE
            } else {
                DARK_SQUARE
            };
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{square}" height="{square}" fill="{fill}"/>"#,
                file * square,
                rank * square,
            );
        }
    }

    // Ranks come eighth-first in FEN, which matches top-down drawing.
    for (rank, pieces) in ranks.iter().enumerate() {
        let mut file = 0u32;
        for ch in pieces.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file += skip;
                continue;
            }
            if file >= 8 {
                return Err(ReportError::InvalidFen(fen.to_string()));
            }
            let glyph = piece_glyph(ch).ok_or_else(|| ReportError::InvalidFen(fen.to_string()))?;
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" font-size="{}" text-anchor="middle" dominant-baseline="central">{glyph}</text>"#,
                file * square + square / 2,
                rank as u32 * square + square / 2,
                square * 9 / 10,
            );
            file += 1;
        }
        if file != 8 {
            return Err(ReportError::InvalidFen(fen.to_string()));
        }
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn piece_glyph(piece: char) -> Option<char> {
    Some(match piece {
        'K' => '\u{2654}',
        'Q' => '\u{2655}',
        'R' => '\u{2656}',
        'B' => '\u{2657}',
        'N' => '\u{2658}',
        'P' => '\u{2659}',
        'k' => '\u{265A}',
        'q' => '\u{265B}',
        'r' => '\u{265C}',
        'b' => '\u{265D}',
        'n' => '\u{265E}',
        'p' => '\u{265F}',
        _ => return None,
    })
}
