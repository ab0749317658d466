use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::logger::ShowdownInfo;
use crate::player::Seat;

/// Default starting stack size for each player in chips
pub const STARTING_STACK: u32 = 10_000;
pub const SMALL_BLIND: u32 = 50;
pub const BIG_BLIND: u32 = 100;

/// Blinds and stacks shared by every hand of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub small_blind: u32,
    pub big_blind: u32,
    pub starting_stack: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            small_blind: SMALL_BLIND,
            big_blind: BIG_BLIND,
            starting_stack: STARTING_STACK,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.small_blind == 0 || self.big_blind == 0 {
            return Err(GameError::InvalidConfig("blinds must be positive".into()));
        }
        if self.small_blind > self.big_blind {
            return Err(GameError::InvalidConfig(format!(
                "small blind {} exceeds big blind {}",
                self.small_blind, self.big_blind
            )));
        }
        if self.starting_stack == 0 {
            return Err(GameError::InvalidConfig(
                "starting stack must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    Fold,
    Showdown,
}

/// Settled result of a finished hand. Deltas are net chip changes and always
/// sum to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandOutcome {
    /// `None` for a split pot.
    pub winner: Option<Seat>,
    pub pot: u32,
    pub sb_delta: i64,
    pub bb_delta: i64,
    pub ending: Ending,
    pub showdown: Option<ShowdownInfo>,
}

impl HandOutcome {
    pub fn delta(&self, seat: Seat) -> i64 {
        match seat {
            Seat::SmallBlind => self.sb_delta,
            Seat::BigBlind => self.bb_delta,
        }
    }
}
