//! # duelbench-judge: Post-Match Decision Audit
//!
//! Grades logged river decisions once a match is over. Equity is exact: the
//! hero's hand is compared against every two-card holding the opponent could
//! have. Facing a bet the judge compares calling against folding; with no bet
//! to face it compares betting (under a fixed fold-equity assumption) against
//! checking.
//!
//! ```rust
//! use duelbench_engine::cards::parse_cards;
//! use duelbench_judge::equity::river_equity;
//!
//! let hero = parse_cards("As Ks").unwrap();
//! let board = parse_cards("Qs Js Ts 2d 3c").unwrap();
//! let eq = river_equity([hero[0], hero[1]], &board).unwrap();
//! assert_eq!(eq.value(), 1.0);
//! ```

use thiserror::Error;

pub mod equity;
pub mod verdict;

pub use equity::{river_equity, Equity};
pub use verdict::{accuracy_by_actor, judge_row, judge_rows, Accuracy, JudgeConfig, Verdict};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JudgeError {
    #[error("river equity needs a five-card board, got {0} cards")]
    IncompleteBoard(usize),
    #[error("card {0} appears more than once")]
    DuplicateCard(String),
}
