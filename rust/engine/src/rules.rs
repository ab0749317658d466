use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::player::PlayerAction as A;

/// Action name without an amount, as it appears in legal-action sets and on
/// the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Raise => "raise",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    /// Case-insensitive; `bet` is accepted as a synonym of `raise`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(ActionKind::Fold),
            "check" => Ok(ActionKind::Check),
            "call" => Ok(ActionKind::Call),
            "raise" | "bet" => Ok(ActionKind::Raise),
            other => Err(format!("unknown action {other:?}")),
        }
    }
}

impl A {
    pub fn kind(&self) -> ActionKind {
        match self {
            A::Fold => ActionKind::Fold,
            A::Check => ActionKind::Check,
            A::Call => ActionKind::Call,
            A::Raise(_) => ActionKind::Raise,
        }
    }

    pub fn amount(&self) -> Option<u32> {
        match self {
            A::Raise(to) => Some(*to),
            _ => None,
        }
    }
}

/// Inclusive raise-to range for the acting player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RaiseBounds {
    pub min_to: u32,
    pub max_to: u32,
}

impl RaiseBounds {
    /// `min_to` is the full raise `current_bet + min_raise`, capped at the
    /// player's shove so a short stack can still go all-in.
    pub fn new(current_bet: u32, min_raise: u32, committed: u32, stack: u32) -> Self {
        let max_to = committed + stack;
        let min_to = current_bet.saturating_add(min_raise).min(max_to);
        Self { min_to, max_to }
    }

    pub fn contains(&self, to: u32) -> bool {
        (self.min_to..=self.max_to).contains(&to)
    }
}

/// Legal action set for a player who is neither folded nor all-in.
///
/// Facing no bet the only passive option is a check; facing a bet the player
/// may fold or call. A raise is offered when neither side is all-in and the
/// player can put in more than the current bet.
///
/// # Examples
///
/// ```
/// use duelbench_engine::rules::{legal_actions, ActionKind};
///
/// let legal = legal_actions(50, false, 1000, 50, 100);
/// assert_eq!(legal, vec![ActionKind::Fold, ActionKind::Call, ActionKind::Raise]);
///
/// let legal = legal_actions(0, true, 1000, 0, 0);
/// assert_eq!(legal, vec![ActionKind::Check]);
/// ```
pub fn legal_actions(
    to_call: u32,
    opponent_all_in: bool,
    stack: u32,
    committed: u32,
    current_bet: u32,
) -> Vec<ActionKind> {
    let mut legal = if to_call == 0 {
        vec![ActionKind::Check]
    } else {
        vec![ActionKind::Fold, ActionKind::Call]
    };
    if !opponent_all_in && stack > 0 && committed + stack > current_bet {
        legal.push(ActionKind::Raise);
    }
    legal
}

/// Validates a player action against the legal set and raise bounds.
///
/// # Errors
///
/// - [`GameError::IllegalAction`] - the action kind is not in `legal`
/// - [`GameError::RaiseOutOfBounds`] - a raise-to outside `bounds`
///
/// # Examples
///
/// ```
/// use duelbench_engine::rules::{validate_action, ActionKind, RaiseBounds};
/// use duelbench_engine::player::PlayerAction;
/// use duelbench_engine::errors::GameError;
///
/// let legal = [ActionKind::Fold, ActionKind::Call, ActionKind::Raise];
/// let bounds = RaiseBounds::new(100, 100, 50, 9950);
///
/// assert!(validate_action(&legal, bounds, PlayerAction::Raise(200)).is_ok());
/// assert!(matches!(
///     validate_action(&legal, bounds, PlayerAction::Raise(199)),
///     Err(GameError::RaiseOutOfBounds { .. })
/// ));
/// assert!(matches!(
///     validate_action(&legal, bounds, PlayerAction::Check),
///     Err(GameError::IllegalAction { .. })
/// ));
/// ```
pub fn validate_action(
    legal: &[ActionKind],
    bounds: RaiseBounds,
    action: A,
) -> Result<A, GameError> {
    if !legal.contains(&action.kind()) {
        return Err(GameError::IllegalAction {
            action: action.kind(),
            legal: legal.to_vec(),
        });
    }
    match action {
        A::Raise(to) if !bounds.contains(to) => Err(GameError::RaiseOutOfBounds {
            amount: to,
            min: bounds.min_to,
            max: bounds.max_to,
        }),
        other => Ok(other),
    }
}
