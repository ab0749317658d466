use thiserror::Error;

use crate::player::Seat;
use crate::rules::ActionKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal action {action} (legal: {legal:?})")]
    IllegalAction {
        action: ActionKind,
        legal: Vec<ActionKind>,
    },
    #[error("Raise to {amount} outside [{min}, {max}]")]
    RaiseOutOfBounds { amount: u32, min: u32, max: u32 },
    #[error("Hand already complete")]
    HandComplete,
    #[error("Hand still in progress")]
    HandInProgress,
    #[error("Deck exhausted")]
    DeckExhausted,
    #[error("Invalid card: {0:?}")]
    InvalidCard(String),
    #[error("Invalid table configuration: {0}")]
    InvalidConfig(String),
    #[error("Chip conservation violated in hand {hand_id}: {detail}")]
    ChipConservationViolation { hand_id: String, detail: String },
    #[error("Showdown evaluators disagree in hand {hand_id}: declared {declared:?}, recomputed {recomputed:?}")]
    EvalMismatch {
        hand_id: String,
        declared: Option<Seat>,
        recomputed: Option<Seat>,
    },
}
