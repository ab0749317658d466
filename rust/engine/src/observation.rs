use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::logger::Street;
use crate::player::Seat;
use crate::rules::ActionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stacks {
    pub hero: u32,
    pub villain: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinds {
    pub sb: u32,
    pub bb: u32,
}

/// What one seat is allowed to see at a decision point. This is the whole
/// input a decision-maker receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub hand_id: String,
    pub seat: Seat,
    pub street: Street,
    pub hole_cards: [Card; 2],
    pub board: Vec<Card>,
    pub stacks: Stacks,
    pub blinds: Blinds,
    pub pot: u32,
    pub to_call: u32,
    pub min_raise_to: u32,
    pub max_raise_to: u32,
    pub legal_actions: Vec<ActionKind>,
    pub history_len: usize,
}

impl Observation {
    pub fn can(&self, kind: ActionKind) -> bool {
        self.legal_actions.contains(&kind)
    }
}
