//! Integration tests for the analysis pipeline.
//!
//! The pipeline tests drive analyze -> assign_badges -> summary end to end
//! with a scripted engine. The last test talks to a real Stockfish and is
//! ignored by default; run with:
//! `cargo test -p kibitz-analysis --test integration -- --ignored`

use std::collections::VecDeque;
use std::time::Duration;

use kibitz_analysis::{
    analyze, assign_badges, summary, AnalysisOptions, EngineAdapter, GameRecord, Thresholds,
};
use kibitz_engine::{EngineError, Line, Score, UciEngine};
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Position as _};

struct ScriptedEngine {
    responses: VecDeque<Vec<Line>>,
}

impl ScriptedEngine {
    fn new(responses: Vec<Vec<Line>>) -> Self {
        Self {
            responses: responses.into(),
        }
    }
}

impl EngineAdapter for ScriptedEngine {
    fn analyse(
        &mut self,
        _fen: &str,
        _limit: Duration,
        _multipv: u32,
    ) -> Result<Vec<Line>, EngineError> {
        self.responses
            .pop_front()
            .ok_or_else(|| EngineError::InvalidResponse("script exhausted".to_string()))
    }
}

fn record_from_sans(sans: &[&str]) -> GameRecord {
    let mut board = Chess::default();
    let mut moves = Vec::new();
    for s in sans {
        let san: SanPlus = s.parse().expect("valid SAN");
        let m = san.san.to_move(&board).expect("legal move");
        board.play_unchecked(m.clone());
        moves.push(m);
    }
    GameRecord {
        headers: vec![
            ("White".to_string(), "White Player".to_string()),
            ("Black".to_string(), "Black Player".to_string()),
        ],
        start: Chess::default(),
        moves,
    }
}

fn cp(centipawns: i32, uci: &str) -> Line {
    Line {
        score: Score::Centipawns(centipawns),
        pv: vec![uci.to_string()],
    }
}

#[test]
fn test_pipeline_flags_the_blunder_and_pulls_its_answer() {
    // Scholar's mate. The blunder 3... Nf6 turns a level position into a
    // forced mate; the analyzer sees the swing between the records before
    // and after it.
    let record = record_from_sans(&["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]);
    let responses = vec![
        vec![cp(30, "e2e4"), cp(20, "d2d4")],  // before e4
        vec![cp(25, "e7e5"), cp(15, "c7c5")],  // before e5
        vec![cp(20, "g1f3"), cp(10, "f1c4")],  // before Bc4
        vec![cp(15, "b8c6"), cp(5, "g8f6")],   // before Nc6
        vec![cp(10, "g1f3"), cp(0, "d1h5")],   // before Qh5
        vec![cp(-20, "g7g6"), cp(-40, "d8e7")], // before Nf6??
        vec![
            Line {
                score: Score::Mate(1),
                pv: vec!["h5f7".to_string()],
            },
            cp(150, "c4f7"),
        ], // before Qxf7#
        vec![Line {
            score: Score::Mate(0),
            pv: vec![],
        }], // mated
    ];

    let options = AnalysisOptions {
        ignore_first_n_plies: 0,
        ..AnalysisOptions::default()
    };
    let mut engine = ScriptedEngine::new(responses);
    let game = analyze(&mut engine, &record, &options).unwrap();

    assert_eq!(game.positions.len(), 8);
    assert!(game.positions[7].move_played.is_none());

    let badges = assign_badges(&game.positions, &Thresholds::default());

    // The pre-blunder record's first choice swings by nearly ten pawns.
    let blunder_fen = &game.positions[5].position.fen;
    assert!(badges.get(blunder_fen).starts_with('e'));

    // The mating position has an 8.5-pawn spread between its lines.
    let mating_fen = &game.positions[6].position.fen;
    assert!(badges.get(mating_fen).contains('f'));

    let shown = summary(&game.positions, &badges);
    let shown_fens: Vec<&str> = shown.iter().map(|p| p.position.fen.as_str()).collect();

    // The error position pulls its successor; the successor's own badge
    // is then consumed without a second lookahead.
    assert!(shown_fens.contains(&blunder_fen.as_str()));
    let blunder_at = shown_fens
        .iter()
        .position(|fen| fen == blunder_fen)
        .unwrap();
    assert_eq!(shown_fens[blunder_at + 1], mating_fen.as_str());
}

#[test]
fn test_pipeline_quiet_game_has_empty_summary() {
    let record = record_from_sans(&["e4", "e5", "Nf3"]);
    let responses = (0..4)
        .map(|_| vec![cp(20, "g1f3"), cp(15, "b1c3")])
        .collect();

    let options = AnalysisOptions {
        ignore_first_n_plies: 0,
        ..AnalysisOptions::default()
    };
    let mut engine = ScriptedEngine::new(responses);
    let game = analyze(&mut engine, &record, &options).unwrap();

    let badges = assign_badges(&game.positions, &Thresholds::default());
    assert!(summary(&game.positions, &badges).is_empty());
}

/// Check if Stockfish is available in PATH.
fn stockfish_available() -> bool {
    std::process::Command::new("stockfish")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|mut child| {
            let _ = child.kill();
            let _ = child.wait();
            true
        })
        .unwrap_or(false)
}

#[test]
#[ignore = "requires Stockfish"]
fn test_analyze_with_real_engine() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let mut engine = UciEngine::spawn("stockfish").expect("Failed to spawn Stockfish");
    engine.new_game().expect("Failed to reset engine");

    let record = record_from_sans(&["e4", "e5"]);
    let options = AnalysisOptions {
        ignore_first_n_plies: 0,
        multipv: 3,
        seconds_per_ply: 0.2,
    };

    let game = analyze(&mut engine, &record, &options).expect("Analysis failed");

    assert_eq!(game.positions.len(), 3);
    for pos in &game.positions {
        assert!(!pos.position.evaluations.is_empty());
        // Early opening positions stay within a pawn of equality.
        let first = pos.position.evaluations[0].score;
        assert!(first.abs() < 3.0, "unexpected score {}", first);
    }
    assert!(game.positions[2].move_played.is_none());
}
