//! Value records produced by game analysis.

/// A chess move in both algebraic and coordinate notation.
///
/// Both fields absent is the "no move" sentinel, used for the terminal
/// record of a game and for engine lines with nothing to suggest
/// (checkmate, stalemate).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Move {
    /// Standard algebraic notation (e.g., "Nf3").
    pub san: Option<String>,
    /// Coordinate notation (e.g., "g1f3").
    pub uci: Option<String>,
}

impl Move {
    pub fn new(san: impl Into<String>, uci: impl Into<String>) -> Self {
        Self {
            san: Some(san.into()),
            uci: Some(uci.into()),
        }
    }

    /// The "no move" sentinel.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.san.is_none() && self.uci.is_none()
    }
}

/// One ranked engine candidate: a score and the move it suggests.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Score in pawn units from White's perspective; forced mates are
    /// clamped to ±10.0.
    pub score: f64,
    /// The engine's suggested move for this line, [`Move::none`] for
    /// terminal positions.
    pub best: Move,
}

/// An evaluated board state.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Full FEN of the board state, used as the position's identity.
    pub fen: String,
    /// Candidate evaluations ranked best-to-worst by the engine. The
    /// ranking is authoritative and never re-sorted.
    pub evaluations: Vec<Evaluation>,
}

/// A [`Position`] paired with the move actually played from it.
///
/// The final record of a game carries the [`Move::none`] sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionWithMove {
    pub position: Position,
    pub move_played: Move,
}

/// A fully analyzed game: PGN headers plus every evaluated ply and the
/// terminal position.
#[derive(Debug, Clone)]
pub struct Game {
    /// Header key/value pairs in PGN order.
    pub headers: Vec<(String, String)>,
    pub positions: Vec<PositionWithMove>,
}
