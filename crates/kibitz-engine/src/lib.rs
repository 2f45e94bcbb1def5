//! UCI engine adapter for position analysis.
//!
//! This crate wraps a UCI-compatible engine (like Stockfish) running as a
//! subprocess and exposes the small slice of the protocol needed for game
//! annotation: option configuration, new-game resets, and fixed-time
//! multipv analysis of a single position.
//!
//! Scores are returned exactly as the engine reports them, relative to the
//! side to move. Perspective and unit conversion are the caller's job.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Maximum number of lines to read before giving up on a UCI response.
pub const MAX_UCI_LINES: usize = 4096;

/// Errors that can occur when working with a UCI engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process or perform I/O on its pipes.
    #[error("failed to spawn engine: {0}")]
    Spawn(#[from] std::io::Error),
    /// Engine executable was not found at the specified path.
    #[error("engine not found at path: {0}")]
    NotFound(String),
    /// Engine failed the UCI handshake.
    #[error("engine initialization failed")]
    InitFailed,
    /// Engine returned an invalid or unexpected response.
    #[error("invalid engine response: {0}")]
    InvalidResponse(String),
}

/// An engine score, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn evaluation (positive = side to move is better).
    Centipawns(i32),
    /// Mate in N moves (positive = side to move mates, zero or negative =
    /// side to move is mated).
    Mate(i32),
}

/// One ranked candidate line from a multipv search.
///
/// Lines come back ordered best-first. The pv is empty for terminal
/// positions (checkmate or stalemate), where the engine has no move to
/// suggest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub score: Score,
    /// Principal variation in UCI notation, best move first.
    pub pv: Vec<String>,
}

/// Engine session options, applied once per game.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Number of search threads.
    pub threads: u32,
    /// Hash table size in megabytes.
    pub hash_mb: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 4,
            hash_mb: 256,
        }
    }
}

/// A deepest-so-far info line parsed from the engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InfoLine {
    /// 1-based multipv rank.
    rank: usize,
    depth: u32,
    score: Score,
    pv: Vec<String>,
}

/// Wrapper for a UCI-compatible analysis engine subprocess.
///
/// One session is meant to cover one game: spawn, [`configure`], then
/// [`analyse`] per ply. Dropping the session sends `quit` and waits for the
/// process, so the engine is released on every exit path.
///
/// [`configure`]: UciEngine::configure
/// [`analyse`]: UciEngine::analyse
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: String,
}

impl UciEngine {
    /// Spawns the engine process and performs the UCI handshake.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the path doesn't exist and isn't a
    ///   bare command name to be resolved via `PATH`
    /// - [`EngineError::Spawn`] if the process fails to start
    /// - [`EngineError::InitFailed`] if the handshake fails
    pub fn spawn(engine_path: &str) -> Result<Self, EngineError> {
        // A bare name like "stockfish" is resolved through PATH; only
        // reject explicit paths that don't exist.
        if engine_path.contains(std::path::MAIN_SEPARATOR)
            && !std::path::Path::new(engine_path).exists()
        {
            return Err(EngineError::NotFound(engine_path.to_string()));
        }

        let mut process = Command::new(engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = process.stdin.take().ok_or(EngineError::InitFailed)?;
        let stdout = process.stdout.take().ok_or(EngineError::InitFailed)?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: String::new(),
        };
        engine.init_uci()?;

        Ok(engine)
    }

    /// Sends "uci", captures the engine name, waits for "uciok"/"readyok".
    fn init_uci(&mut self) -> Result<(), EngineError> {
        self.send_command("uci")?;

        let mut name = String::new();
        for _ in 0..MAX_UCI_LINES {
            let line = self.read_line()?;
            if let Some(id) = line.strip_prefix("id name ") {
                name = id.to_string();
            } else if line == "uciok" {
                self.name = if name.is_empty() {
                    "Unknown Engine".to_string()
                } else {
                    name
                };
                self.wait_ready()?;
                return Ok(());
            }
        }

        Err(EngineError::InitFailed)
    }

    /// Returns the engine's name as reported via `id name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies session options (threads, hash size).
    pub fn configure(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        self.send_command(&format!("setoption name Threads value {}", options.threads))?;
        self.send_command(&format!("setoption name Hash value {}", options.hash_mb))?;
        self.wait_ready()
    }

    /// Clears engine state between games.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.send_command("ucinewgame")?;
        self.wait_ready()
    }

    /// Analyses a position for a fixed amount of time.
    ///
    /// Returns the ranked candidate lines, best first. The number of lines
    /// can be lower than `multipv` when the position has fewer legal moves;
    /// terminal positions yield a single line with an empty pv.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidResponse`] if the engine stops without
    /// reporting any evaluation, or floods the pipe without concluding the
    /// search.
    pub fn analyse(
        &mut self,
        fen: &str,
        limit: Duration,
        multipv: u32,
    ) -> Result<Vec<Line>, EngineError> {
        self.send_command(&format!("setoption name MultiPV value {}", multipv))?;
        self.send_command(&format!("position fen {}", fen))?;
        self.send_command(&format!("go movetime {}", limit.as_millis()))?;

        let mut ranked: Vec<Option<InfoLine>> = vec![None; multipv.max(1) as usize];

        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InvalidResponse(
                    "too many lines without bestmove".to_string(),
                ));
            }
            lines_read += 1;
            let line = self.read_line()?;

            if line.starts_with("info ") {
                if let Some(info) = Self::parse_info_line(&line) {
                    let slot = match ranked.get_mut(info.rank - 1) {
                        Some(slot) => slot,
                        None => continue,
                    };
                    // Engines re-announce every rank as the search deepens;
                    // keep the deepest report per rank.
                    let stale = slot.as_ref().is_some_and(|prev| prev.depth > info.depth);
                    if !stale {
                        *slot = Some(info);
                    }
                }
            } else if line.starts_with("bestmove") {
                break;
            }
        }

        let lines: Vec<Line> = ranked
            .into_iter()
            .map_while(|slot| {
                slot.map(|info| Line {
                    score: info.score,
                    pv: info.pv,
                })
            })
            .collect();

        if lines.is_empty() {
            return Err(EngineError::InvalidResponse(
                "no evaluation received".to_string(),
            ));
        }
        Ok(lines)
    }

    /// Parses a UCI info line, e.g.
    /// `info depth 15 multipv 2 score cp -35 nodes 50000 pv e7e5 g1f3`.
    ///
    /// Returns `None` for info lines without depth or score (currmove
    /// announcements, string output, and similar).
    fn parse_info_line(line: &str) -> Option<InfoLine> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        let mut rank: usize = 1;
        let mut depth: Option<u32> = None;
        let mut score: Option<Score> = None;
        let mut pv: Vec<String> = Vec::new();
        let mut in_pv = false;

        let mut i = 0;
        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    if i + 1 < parts.len() {
                        depth = parts[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "multipv" => {
                    if i + 1 < parts.len() {
                        rank = parts[i + 1].parse().unwrap_or(1);
                        i += 1;
                    }
                }
                "score" => {
                    if i + 2 < parts.len() {
                        match parts[i + 1] {
                            "cp" => {
                                score = parts[i + 2].parse().ok().map(Score::Centipawns);
                                i += 2;
                            }
                            "mate" => {
                                score = parts[i + 2].parse().ok().map(Score::Mate);
                                i += 2;
                            }
                            _ => {}
                        }
                    }
                }
                "pv" => {
                    in_pv = true;
                }
                other => {
                    if in_pv {
                        pv.push(other.to_string());
                    }
                }
            }
            i += 1;
        }

        Some(InfoLine {
            rank: rank.max(1),
            depth: depth?,
            score: score?,
            pv,
        })
    }

    /// Sends "isready" and blocks until "readyok".
    fn wait_ready(&mut self) -> Result<(), EngineError> {
        self.send_command("isready")?;
        for _ in 0..MAX_UCI_LINES {
            if self.read_line()? == "readyok" {
                return Ok(());
            }
        }
        Err(EngineError::InitFailed)
    }

    fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        debug!(command, "engine <");
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let bytes = self.stdout.read_line(&mut line)?;
        if bytes == 0 {
            return Err(EngineError::InvalidResponse(
                "engine closed unexpectedly".to_string(),
            ));
        }
        let line = line.trim().to_string();
        debug!(line, "engine >");
        Ok(line)
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        // Release the engine on every exit path.
        let _ = self.send_command("quit");
        let _ = self.process.wait();
    }
}
