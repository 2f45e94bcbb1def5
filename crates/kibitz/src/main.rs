//! kibitz - annotates PGN games with engine analysis.
//!
//! Reads games from a PGN file, analyzes each one ply by ply with a UCI
//! engine, classifies the interesting positions, and writes one HTML
//! report per game.

mod config;
mod pgn;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use pgn_reader::Reader;
use tracing::{info, warn};

use config::Config;
use kibitz_analysis::{analyze, assign_badges, summary, GameRecord, PositionWithMove};
use kibitz_engine::{EngineOptions, UciEngine};
use pgn::RecordCollector;

#[derive(Parser)]
#[command(name = "kibitz")]
#[command(about = "Annotates chess games with engine analysis")]
struct Cli {
    /// PGN file with games to analyze
    #[arg(long)]
    input_pgn: PathBuf,

    /// Directory for the HTML reports
    #[arg(long)]
    output_dir: PathBuf,

    /// Output only the interesting positions
    #[arg(long)]
    summary_only: bool,

    /// Configuration file (defaults to kibitz.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a UCI engine executable
    #[arg(long)]
    engine: Option<String>,

    /// Engine search threads
    #[arg(long)]
    engine_threads: Option<u32>,

    /// Engine hash table size (MB)
    #[arg(long)]
    engine_hash: Option<u32>,

    /// Ranked candidate lines to request per position
    #[arg(long)]
    multipv: Option<u32>,

    /// Time budget per ply, in seconds
    #[arg(long)]
    seconds_per_ply: Option<f64>,

    /// Opening plies to play through without analyzing
    #[arg(long)]
    ignore_plies: Option<usize>,

    /// First-choice score swing (pawns) for a position to count as an error
    #[arg(long)]
    threshold_error: Option<f64>,

    /// First-to-last candidate spread (pawns) for a clear best move
    #[arg(long)]
    threshold_first_choice: Option<f64>,
}

impl Cli {
    /// Folds the command-line overrides into the file/default config.
    fn apply_to(&self, config: &mut Config) {
        if let Some(engine) = &self.engine {
            config.engine.path = engine.clone();
        }
        if let Some(threads) = self.engine_threads {
            config.engine.threads = threads;
        }
        if let Some(hash_mb) = self.engine_hash {
            config.engine.hash_mb = hash_mb;
        }
        if let Some(multipv) = self.multipv {
            config.analysis.multipv = multipv;
        }
        if let Some(seconds) = self.seconds_per_ply {
            config.analysis.seconds_per_ply = seconds;
        }
        if let Some(ignore) = self.ignore_plies {
            config.analysis.ignore_first_n_plies = ignore;
        }
        if let Some(error) = self.threshold_error {
            config.thresholds.error = error;
        }
        if let Some(first_choice) = self.threshold_first_choice {
            config.thresholds.first_choice = first_choice;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;
    let input = fs::File::open(&cli.input_pgn)
        .with_context(|| format!("failed to open {}", cli.input_pgn.display()))?;

    let stem = cli
        .input_pgn
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "games".to_string());

    let mut reader = Reader::new(input);
    let mut collector = RecordCollector::new();
    let mut game_num = 0u32;

    while let Some(parsed) = reader.read_game(&mut collector)? {
        game_num += 1;
        let record = match parsed {
            Ok(record) => record,
            Err(error) => {
                warn!(game = game_num, %error, "skipping unparsable game");
                continue;
            }
        };

        info!(game = game_num, plies = record.moves.len(), "analyzing game");
        let html = annotate(&config, &record, cli.summary_only)?;

        let out_path = output_path(&cli.output_dir, &stem, game_num);
        fs::write(&out_path, html)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!(path = %out_path.display(), "report written");
    }

    if game_num == 0 {
        warn!("no games found in {}", cli.input_pgn.display());
    }
    Ok(())
}

/// Analyzes one game with a fresh engine session and renders its report.
///
/// The session is dropped (and the engine process released) as soon as the
/// per-ply record is built, on success and failure alike.
fn annotate(config: &Config, record: &GameRecord, summary_only: bool) -> anyhow::Result<String> {
    let mut engine = UciEngine::spawn(&config.engine.path)?;
    info!(engine = engine.name(), "engine ready");
    engine.configure(&EngineOptions {
        threads: config.engine.threads,
        hash_mb: config.engine.hash_mb,
    })?;
    engine.new_game()?;
    let game = analyze(&mut engine, record, &config.analysis)?;
    drop(engine);

    let badges = assign_badges(&game.positions, &config.thresholds);
    let shown: Vec<&PositionWithMove> = if summary_only {
        summary(&game.positions, &badges)
    } else {
        game.positions.iter().collect()
    };

    Ok(kibitz_report::render_game(&game.headers, &shown, &badges)?)
}

fn output_path(dir: &Path, stem: &str, game_num: u32) -> PathBuf {
    dir.join(format!("{}.{:02}.html", stem, game_num))
}
