//! Tetonor puzzle engine
//!
//! A Tetonor board is a grid of sums and products together with a strip of
//! the numbers that produced them. The player pairs strip numbers so that
//! each pair's sum and product both appear in the grid.
//!
//! This crate holds everything that does not depend on a front end: the
//! configuration table, puzzle generation and repair, match validation for
//! standard and pro mode, scoring, and the ranking store contract.

pub mod clock;
pub mod config;
pub mod conflict;
pub mod error;
pub mod game;
pub mod generator;
pub mod puzzle;
pub mod ranking;
pub mod scheduler;
pub mod scoring;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Difficulty, GameConfig, LevelConfig, RepairPolicy, MAX_PAIRS};
pub use conflict::find_conflicts;
pub use error::{GameError, RankingError};
pub use game::{
    Game, GameEvent, GameMode, GameView, IgnoreReason, Notice, Phase, RoundState, Selection,
};
pub use generator::{GeneratedPuzzle, GenerationReport, Generator};
pub use puzzle::{CellKind, GridCell, Pair, Puzzle, StripItem};
pub use ranking::{
    ApiResponse, MemoryRankingStore, RankingApi, RankingEntry, RankingRow, RankingStore,
    SubmitOutcome,
};
pub use scheduler::{CancellationToken, Scheduler, TaskId};
pub use scoring::{ScoreKind, ScoringPolicy};
