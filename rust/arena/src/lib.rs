//! # duelbench-arena: Mirrored Duels
//!
//! Runs heads-up matches between two [`Agent`](duelbench_ai::Agent)s. Every
//! deck is played twice with the seats swapped (a mirrored pair), so card
//! luck cancels out of the pair result. After each pair both rating systems
//! are updated; after the match the river judge grades the logged decisions.
//!
//! ## Modules
//!
//! - [`config`] - [`ArenaConfig`], plain values for one match
//! - [`stop`] - Stop handle and token (graceful or immediate)
//! - [`duel`] - Hand and pair orchestration, decision deadlines, fallbacks
//! - [`runner`] - [`run_match`] and [`run_matrix`]
//! - [`store`] - Persistence contract with in-memory and SQLite stores
//! - [`report`] - Match and matrix reports
//! - [`logging`] - Subscriber setup and a capture layer for tests
//!
//! ## Quick Start
//!
//! ```rust
//! use duelbench_arena::{run_match, ArenaConfig, Contestant, MemoryStore, StopHandle};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let config = ArenaConfig { pairs: 2, seed: Some(7), ..ArenaConfig::default() };
//! let a = Contestant::builtin("baseline", 1).unwrap();
//! let b = Contestant::builtin("station", 2).unwrap();
//! let mut store = MemoryStore::default();
//! let stop = StopHandle::new();
//!
//! let report = run_match(&config, &a, &b, &mut store, stop.token(), None).await.unwrap();
//! assert!(report.pairs_played >= 1);
//! assert_eq!(report.contestants[0].bank + report.contestants[1].bank, 20_000);
//! # });
//! ```

use thiserror::Error;

use duelbench_ai::policy::ValidationError;
use duelbench_ai::AgentError;
use duelbench_engine::errors::GameError;
use duelbench_rating::RatingError;

pub mod config;
pub mod duel;
pub mod logging;
pub mod report;
pub mod runner;
pub mod stop;
pub mod store;

pub use config::{ArenaConfig, StopConfig};
pub use duel::{decide_with_timeout, Contestant, Duel};
pub use report::{ActionTally, ContestantReport, MatchEnd, MatchReport, MatrixReport};
pub use runner::{run_match, run_matrix};
pub use stop::{StopHandle, StopMode, StopToken};
pub use store::{MatchStore, MemoryStore, Recorder, SqliteStore, StoreError};

#[derive(Debug, Error)]
pub enum ArenaError {
    /// A hand broke an engine invariant.
    #[error("engine invariant violated: {0}")]
    Engine(#[from] GameError),
    #[error("rating update failed: {0}")]
    Rating(#[from] RatingError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Why a single decision did not produce a usable action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("no reply within {0} ms")]
    Timeout(u64),
    #[error("decision canceled by stop request")]
    Canceled,
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
