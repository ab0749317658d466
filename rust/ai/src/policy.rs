//! Reply validation and the deterministic policies layered on top of a
//! decision-maker.

use rand::Rng;
use thiserror::Error;

use duelbench_engine::observation::Observation;
use duelbench_engine::player::PlayerAction;
use duelbench_engine::rules::ActionKind;

use crate::Decision;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    #[error("{action} is not legal here (legal: {legal:?})")]
    IllegalAction {
        action: ActionKind,
        legal: Vec<ActionKind>,
    },
    #[error("raise requires an amount")]
    MissingAmount,
    #[error("raise to {amount} outside [{min}, {max}]")]
    RaiseOutOfBounds { amount: u32, min: u32, max: u32 },
}

/// Turns a wire reply into an engine action, or explains why it can't.
///
/// The action must be in the observation's legal set and a raise must carry a
/// raise-to inside `[min_raise_to, max_raise_to]`. `bet` is read as `raise`.
pub fn validate(obs: &Observation, reply: &Decision) -> Result<PlayerAction, ValidationError> {
    let kind: ActionKind = reply
        .action
        .parse()
        .map_err(|_| ValidationError::UnknownAction(reply.action.clone()))?;
    if !obs.can(kind) {
        return Err(ValidationError::IllegalAction {
            action: kind,
            legal: obs.legal_actions.clone(),
        });
    }
    Ok(match kind {
        ActionKind::Fold => PlayerAction::Fold,
        ActionKind::Check => PlayerAction::Check,
        ActionKind::Call => PlayerAction::Call,
        ActionKind::Raise => {
            let amount = reply.amount.ok_or(ValidationError::MissingAmount)?;
            if !(obs.min_raise_to..=obs.max_raise_to).contains(&amount) {
                return Err(ValidationError::RaiseOutOfBounds {
                    amount,
                    min: obs.min_raise_to,
                    max: obs.max_raise_to,
                });
            }
            PlayerAction::Raise(amount)
        }
    })
}

/// Replacement for an invalid, late or failed reply: the first legal entry of
/// call, fold, min-raise, check when facing a bet, otherwise of check,
/// min-raise, call, fold.
pub fn fallback_action(obs: &Observation) -> PlayerAction {
    let ladder = if obs.to_call > 0 {
        [ActionKind::Call, ActionKind::Fold, ActionKind::Raise, ActionKind::Check]
    } else {
        [ActionKind::Check, ActionKind::Raise, ActionKind::Call, ActionKind::Fold]
    };
    ladder
        .into_iter()
        .find(|k| obs.can(*k))
        .map(|k| min_action(k, obs))
        .unwrap_or(PlayerAction::Fold)
}

fn min_action(kind: ActionKind, obs: &Observation) -> PlayerAction {
    match kind {
        ActionKind::Fold => PlayerAction::Fold,
        ActionKind::Check => PlayerAction::Check,
        ActionKind::Call => PlayerAction::Call,
        ActionKind::Raise => PlayerAction::Raise(obs.min_raise_to),
    }
}

/// Randomized exploration when no bet is faced: a check turns into a
/// min-raise with probability `p`, and a raise survives with probability `p`
/// (otherwise it becomes a check). Spots facing a bet are left alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbePolicy {
    probability: f64,
}

impl ProbePolicy {
    /// `probability` is clamped to `[0, 1]`; NaN counts as 0.
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Applies the policy for a uniform `draw` in `[0, 1)`.
    pub fn apply(&self, action: PlayerAction, obs: &Observation, draw: f64) -> PlayerAction {
        if obs.to_call != 0 {
            return action;
        }
        let hit = draw < self.probability;
        match action {
            PlayerAction::Raise(_) if obs.can(ActionKind::Check) && !hit => PlayerAction::Check,
            PlayerAction::Check if obs.can(ActionKind::Raise) && hit => {
                PlayerAction::Raise(obs.min_raise_to)
            }
            other => other,
        }
    }

    pub fn apply_with<R: Rng + ?Sized>(
        &self,
        action: PlayerAction,
        obs: &Observation,
        rng: &mut R,
    ) -> PlayerAction {
        let draw: f64 = rng.random();
        self.apply(action, obs, draw)
    }
}
