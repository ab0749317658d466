//! # duelbench-rating: Duel Ratings
//!
//! Two independent rating systems fed by mirrored-pair results, plus the
//! summary statistics reported alongside them.
//!
//! - [`elo`] - Elo variant with pot-weighted K, decay and an optional judge-accuracy bias
//! - [`glicko2`] - Glicko-2 with the iterative volatility solve
//! - [`stats`] - Seat statistics, Wilson and bootstrap confidence intervals

use thiserror::Error;

pub mod elo;
pub mod glicko2;
pub mod stats;

pub use elo::{Elo, EloConfig, EloDelta};
pub use glicko2::Glicko2;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RatingError {
    #[error("score {0} outside [0, 1]")]
    ScoreOutOfRange(f64),
    #[error("volatility solve did not converge after {iterations} iterations")]
    VolatilityDidNotConverge { iterations: u32 },
    #[error("invalid rating parameter: {0}")]
    InvalidParameter(String),
}

pub(crate) fn check_score(score: f64) -> Result<f64, RatingError> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(RatingError::ScoreOutOfRange(score))
    }
}
