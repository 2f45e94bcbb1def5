//! Per-ply game analysis, interest classification, and summary filtering.
//!
//! This crate turns a parsed game record into a sequence of evaluated
//! positions and decides which of them are worth showing in a report.
//!
//! # Overview
//!
//! - [`analyze`] - walks a game against the engine and builds the per-ply
//!   [`Game`] record
//! - [`errors`], [`difficulties`], [`best_first_choice`] - independent
//!   classification passes over the per-ply sequence
//! - [`assign_badges`] - merges the classifier results into a [`BadgeMap`]
//!   keyed by FEN
//! - [`summary`] - reduces the full sequence to the badge-bearing positions
//!
//! # Example
//!
//! ```ignore
//! use kibitz_analysis::{analyze, assign_badges, summary, AnalysisOptions, Thresholds};
//!
//! let game = analyze(&mut engine, &record, &AnalysisOptions::default())?;
//! let badges = assign_badges(&game.positions, &Thresholds::default());
//! let interesting = summary(&game.positions, &badges);
//! ```

pub mod analyzer;
pub mod badges;
pub mod classify;
pub mod game;
pub mod summary;

pub use analyzer::{analyze, AnalysisOptions, EngineAdapter, GameRecord};
pub use badges::{assign_badges, BadgeMap, Thresholds};
pub use classify::{best_first_choice, difficulties, errors};
pub use game::{Evaluation, Game, Move, Position, PositionWithMove};
pub use summary::summary;
