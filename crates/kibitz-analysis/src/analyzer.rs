//! Sequential construction of the per-ply evaluation record.
//!
//! The analyzer walks a game's move list, asks the engine for ranked
//! candidate evaluations of every board state reached after the configured
//! opening skip, and pairs each evaluated state with the move that was
//! actually played from it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position as _};

use kibitz_engine::{EngineError, Line, Score, UciEngine};

use crate::game::{Evaluation, Game, Move, Position, PositionWithMove};

/// Forced-mate scores are clamped to ±10 pawns.
const MATE_SCORE_PAWNS: f64 = 10.0;

/// A parsed game ready for analysis: headers, starting position, and the
/// mainline moves (already validated for legality by the record source).
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Header key/value pairs in PGN order.
    pub headers: Vec<(String, String)>,
    /// Board state before the first move.
    pub start: Chess,
    /// Mainline moves in game order.
    pub moves: Vec<shakmaty::Move>,
}

/// Options controlling how a game is analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Number of opening plies to play through without evaluating.
    pub ignore_first_n_plies: usize,
    /// Number of ranked candidate lines to request per position.
    pub multipv: u32,
    /// Time budget per engine call.
    pub seconds_per_ply: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            ignore_first_n_plies: 16,
            multipv: 3,
            seconds_per_ply: 60.0,
        }
    }
}

/// The engine interface the analyzer needs: one blocking, stateless call
/// per position.
///
/// Implemented for [`UciEngine`]; tests substitute a scripted fake.
pub trait EngineAdapter {
    fn analyse(
        &mut self,
        fen: &str,
        limit: Duration,
        multipv: u32,
    ) -> Result<Vec<Line>, EngineError>;
}

impl EngineAdapter for UciEngine {
    fn analyse(
        &mut self,
        fen: &str,
        limit: Duration,
        multipv: u32,
    ) -> Result<Vec<Line>, EngineError> {
        UciEngine::analyse(self, fen, limit, multipv)
    }
}

/// Analyzes a game move by move and returns the per-ply record.
///
/// The first `ignore_first_n_plies` moves are pushed without evaluating
/// and leave no trace in the result. Every remaining ply is evaluated on
/// the pre-move board state, paired with the move about to be played, and
/// appended in order. One final engine call on the last board state
/// produces the terminal record with the no-move sentinel.
///
/// With the opening skip at zero, an N-move game yields exactly N+1
/// records.
///
/// # Errors
///
/// Any engine failure aborts the analysis of the whole game. There are no
/// retries and no partial results.
pub fn analyze<E: EngineAdapter>(
    engine: &mut E,
    record: &GameRecord,
    options: &AnalysisOptions,
) -> Result<Game, EngineError> {
    let mut board = record.start.clone();
    let limit = Duration::from_secs_f64(options.seconds_per_ply);
    let ignore = options.ignore_first_n_plies.min(record.moves.len());

    for m in &record.moves[..ignore] {
        board.play_unchecked(m.clone());
    }

    let mut positions = Vec::with_capacity(record.moves.len() - ignore + 1);
    for m in &record.moves[ignore..] {
        let position = evaluate(engine, &board, limit, options.multipv)?;
        // Notation is relative to the pre-move board.
        let move_played = Move::new(
            San::from_move(&board, m.clone()).to_string(),
            m.to_uci(CastlingMode::Standard).to_string(),
        );
        positions.push(PositionWithMove {
            position,
            move_played,
        });
        board.play_unchecked(m.clone());
    }

    let position = evaluate(engine, &board, limit, options.multipv)?;
    positions.push(PositionWithMove {
        position,
        move_played: Move::none(),
    });

    Ok(Game {
        headers: record.headers.clone(),
        positions,
    })
}

/// Runs one engine call and converts the ranked lines into a [`Position`].
fn evaluate<E: EngineAdapter>(
    engine: &mut E,
    board: &Chess,
    limit: Duration,
    multipv: u32,
) -> Result<Position, EngineError> {
    let fen = Fen::from_position(board, EnPassantMode::Legal).to_string();
    let lines = engine.analyse(&fen, limit, multipv)?;

    let evaluations = lines
        .iter()
        .map(|line| Evaluation {
            score: score_to_pawns(line.score, board.turn()),
            best: suggested_move(board, line),
        })
        .collect();

    Ok(Position { fen, evaluations })
}

/// Converts a side-to-move engine score to pawn units from White's
/// perspective, clamping forced mates.
fn score_to_pawns(score: Score, turn: Color) -> f64 {
    let relative = match score {
        Score::Centipawns(cp) => f64::from(cp) / 100.0,
        // Mate 0 means the side to move is already mated.
        Score::Mate(n) if n > 0 => MATE_SCORE_PAWNS,
        Score::Mate(_) => -MATE_SCORE_PAWNS,
    };
    if turn == Color::White {
        relative
    } else {
        -relative
    }
}

/// Extracts the first pv move of a line as a [`Move`], with SAN computed
/// against the evaluated board. Lines without a pv (terminal positions)
/// yield the no-move sentinel.
fn suggested_move(board: &Chess, line: &Line) -> Move {
    let legal = line
        .pv
        .first()
        .and_then(|uci| uci.parse::<UciMove>().ok())
        .and_then(|uci| uci.to_move(board).ok());

    match legal {
        Some(m) => Move::new(
            San::from_move(board, m.clone()).to_string(),
            m.to_uci(CastlingMode::Standard).to_string(),
        ),
        None => Move::none(),
    }
}
