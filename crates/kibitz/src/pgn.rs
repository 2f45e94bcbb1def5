//! Streaming PGN game source.
//!
//! A `pgn-reader` visitor that collects each game's headers and validates
//! its mainline moves against the board model, yielding one
//! [`GameRecord`] per game. Variations, comments, and NAGs are skipped.

use std::mem;
use std::ops::ControlFlow;

use pgn_reader::{Nag, Outcome, RawComment, RawTag, SanPlus, Skip, Visitor};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position as _};
use thiserror::Error;

use kibitz_analysis::GameRecord;

/// Errors for games that cannot be turned into a record.
#[derive(Error, Debug)]
pub enum PgnError {
    /// A mainline move was illegal or ambiguous for its position.
    #[error("illegal move '{san}' at ply {ply}")]
    IllegalMove { san: String, ply: usize },
    /// The FEN header did not describe a valid position.
    #[error("invalid FEN header: {0}")]
    InvalidFen(String),
}

/// Visitor that accumulates one [`GameRecord`] per game.
///
/// A malformed game yields `Err` as the game's output instead of
/// poisoning the stream, so the caller can skip it and keep reading.
pub struct RecordCollector {
    headers: Vec<(String, String)>,
    fen_header: Option<String>,
    start: Chess,
    board: Chess,
    moves: Vec<shakmaty::Move>,
    error: Option<PgnError>,
}

impl RecordCollector {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            fen_header: None,
            start: Chess::default(),
            board: Chess::default(),
            moves: Vec::new(),
            error: None,
        }
    }
}

impl Default for RecordCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for RecordCollector {
    type Tags = ();
    type Movetext = ();
    type Output = Result<GameRecord, PgnError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.headers.clear();
        self.fen_header = None;
        self.start = Chess::default();
        self.board = Chess::default();
        self.moves.clear();
        self.error = None;
        ControlFlow::Continue(())
    }

    fn tag(
        &mut self,
        _: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let key = String::from_utf8_lossy(key).into_owned();
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        if key == "FEN" {
            self.fen_header = Some(value.clone());
        }
        self.headers.push((key, value));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        if let Some(fen) = &self.fen_header {
            let start: Option<Chess> = fen
                .parse::<Fen>()
                .ok()
                .and_then(|fen| fen.into_position(CastlingMode::Standard).ok());
            match start {
                Some(start) => {
                    self.board = start.clone();
                    self.start = start;
                }
                None => self.error = Some(PgnError::InvalidFen(fen.clone())),
            }
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, _: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        if self.error.is_some() {
            return ControlFlow::Continue(());
        }
        match san_plus.san.to_move(&self.board) {
            Ok(m) => {
                self.board.play_unchecked(m.clone());
                self.moves.push(m);
            }
            Err(_) => {
                self.error = Some(PgnError::IllegalMove {
                    san: san_plus.to_string(),
                    ply: self.moves.len() + 1,
                });
            }
        }
        ControlFlow::Continue(())
    }

    fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn comment(&mut self, _: &mut Self::Movetext, _: RawComment<'_>) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn partial_comment(
        &mut self,
        _: &mut Self::Movetext,
        _: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn outcome(&mut self, _: &mut Self::Movetext, _: Outcome) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _: Self::Movetext) -> Self::Output {
        let headers = mem::take(&mut self.headers);
        let moves = mem::take(&mut self.moves);
        let start = mem::replace(&mut self.start, Chess::default());
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(GameRecord {
                headers,
                start,
                moves,
            }),
        }
    }
}
