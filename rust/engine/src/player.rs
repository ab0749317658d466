use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Seat at a heads-up table. The small blind acts first preflop, the big
/// blind first on every later street.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Seat {
    #[serde(rename = "SB")]
    SmallBlind,
    #[serde(rename = "BB")]
    BigBlind,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::SmallBlind => Seat::BigBlind,
            Seat::BigBlind => Seat::SmallBlind,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::SmallBlind => 0,
            Seat::BigBlind => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Seat::SmallBlind => "SB",
            Seat::BigBlind => "BB",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Represents a player action during a betting round.
/// `Raise` carries the total the player's street contribution is raised to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "to", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Check (no bet, only valid if no bet to call)
    Check,
    /// Call the current bet
    Call,
    /// Raise the street contribution to the given total
    Raise(u32),
}

/// One side of a hand: chips behind, chips in front, hole cards and the
/// per-round flags the engine needs to close betting rounds.
#[derive(Debug, Clone)]
pub struct Player {
    seat: Seat,
    stack: u32,
    committed: u32,
    invested: u32,
    hole: [Card; 2],
    folded: bool,
    all_in: bool,
    acted: bool,
}

impl Player {
    pub fn new(seat: Seat, stack: u32, hole: [Card; 2]) -> Self {
        Self {
            seat,
            stack,
            committed: 0,
            invested: 0,
            hole,
            folded: false,
            all_in: false,
            acted: false,
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }
    pub fn stack(&self) -> u32 {
        self.stack
    }
    /// Chips put in on the current street.
    pub fn committed(&self) -> u32 {
        self.committed
    }
    /// Chips put in over the whole hand.
    pub fn invested(&self) -> u32 {
        self.invested
    }
    pub fn hole_cards(&self) -> [Card; 2] {
        self.hole
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    pub fn is_all_in(&self) -> bool {
        self.all_in
    }
    pub fn has_acted(&self) -> bool {
        self.acted
    }

    /// Moves up to `amount` chips from the stack into the pot and returns the
    /// amount actually moved. Emptying the stack marks the player all-in.
    pub(crate) fn commit(&mut self, amount: u32) -> u32 {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        self.committed += paid;
        self.invested += paid;
        if self.stack == 0 {
            self.all_in = true;
        }
        paid
    }

    /// Returns uncalled chips from the current street back to the stack.
    pub(crate) fn refund(&mut self, amount: u32) {
        let back = amount.min(self.committed);
        self.committed -= back;
        self.invested -= back;
        self.stack += back;
        if back > 0 {
            self.all_in = self.stack == 0;
        }
    }

    pub(crate) fn fold(&mut self) {
        self.folded = true;
    }

    pub(crate) fn set_acted(&mut self, acted: bool) {
        self.acted = acted;
    }

    pub(crate) fn start_street(&mut self) {
        self.committed = 0;
        self.acted = false;
    }
}
