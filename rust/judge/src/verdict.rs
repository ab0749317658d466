use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use duelbench_engine::logger::{ActionLogRow, Street};
use duelbench_engine::rules::ActionKind;

use crate::equity::river_equity;

/// Judge name stored alongside verdicts.
pub const JUDGE_NAME: &str = "RiverEquityJudge";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Tolerance for a top action, in big blinds.
    pub epsilon_bb: f64,
    /// Assumed chance a river bet takes the pot down uncontested.
    pub fold_equity: f64,
    /// Assumed bet size as a share of the pot.
    pub bet_fraction: f64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            epsilon_bb: 0.15,
            fold_equity: 0.35,
            bet_fraction: 0.66,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spot {
    FacingBet,
    Unopened,
}

/// Grade of one logged decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub match_id: String,
    pub seq: u64,
    pub hand_id: String,
    pub actor: String,
    pub spot: Spot,
    pub equity: f64,
    pub chosen: ActionKind,
    pub chosen_amount: Option<u32>,
    pub best: ActionKind,
    pub best_amount: Option<u32>,
    pub ev_chosen: f64,
    pub ev_best: f64,
    pub ev_gap_bb: f64,
    pub is_top_action: bool,
}

/// Grades one row. Rows that are not river decisions of a gradeable kind
/// (call/fold facing a bet, check/raise otherwise) yield `None`.
pub fn judge_row(row: &ActionLogRow, bb: u32, config: &JudgeConfig) -> Option<Verdict> {
    if row.street != Street::River {
        return None;
    }
    let spot = if row.to_call > 0 {
        Spot::FacingBet
    } else {
        Spot::Unopened
    };
    let gradeable = match spot {
        Spot::FacingBet => matches!(row.action, ActionKind::Call | ActionKind::Fold),
        Spot::Unopened => matches!(row.action, ActionKind::Check | ActionKind::Raise),
    };
    if !gradeable {
        return None;
    }
    let equity = match river_equity(row.hero_hole(), &row.board) {
        Ok(eq) => eq.value(),
        Err(err) => {
            tracing::debug!(hand_id = %row.hand_id, seq = row.seq, %err, "skipping row");
            return None;
        }
    };

    let bb = if bb == 0 { 100 } else { bb };
    let pot = f64::from(row.pot);
    let (options, best_bet) = match spot {
        Spot::FacingBet => {
            let bet = f64::from(row.to_call);
            let ev_call = equity * (pot + bet) - (1.0 - equity) * bet;
            ([(ActionKind::Fold, 0.0), (ActionKind::Call, ev_call)], None)
        }
        Spot::Unopened => {
            let size = (f64::from(bb)).max((config.bet_fraction * pot).round());
            let f = config.fold_equity;
            let ev_bet = f * pot + (1.0 - f) * (equity * (pot + 2.0 * size) - (1.0 - equity) * size);
            (
                [(ActionKind::Check, 0.0), (ActionKind::Raise, ev_bet)],
                Some(row.current_bet + size as u32),
            )
        }
    };

    let ev_of = |kind: ActionKind| {
        options
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, ev)| *ev)
            .unwrap_or(0.0)
    };
    // passive option only when strictly better; ties go to call or raise
    let (best, ev_best) = if options[0].1 > options[1].1 {
        options[0]
    } else {
        options[1]
    };
    let ev_chosen = ev_of(row.action);
    let gap = ev_best - ev_chosen;
    let ev_gap_bb = gap / f64::from(bb);

    Some(Verdict {
        match_id: row.match_id.clone(),
        seq: row.seq,
        hand_id: row.hand_id.clone(),
        actor: row.actor.clone(),
        spot,
        equity,
        chosen: row.action,
        chosen_amount: row.amount,
        best,
        best_amount: if best == ActionKind::Raise { best_bet } else { None },
        ev_chosen,
        ev_best,
        ev_gap_bb,
        is_top_action: ev_gap_bb <= config.epsilon_bb,
    })
}

pub fn judge_rows(rows: &[ActionLogRow], bb: u32, config: &JudgeConfig) -> Vec<Verdict> {
    rows.iter().filter_map(|r| judge_row(r, bb, config)).collect()
}

/// Top-action count over graded decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    pub good: u32,
    pub total: u32,
}

impl Accuracy {
    pub fn add(&mut self, top: bool) {
        self.total += 1;
        if top {
            self.good += 1;
        }
    }

    pub fn merge(&mut self, other: Accuracy) {
        self.good += other.good;
        self.total += other.total;
    }

    /// `None` until something has been graded.
    pub fn rate(&self) -> Option<f64> {
        (self.total > 0).then(|| f64::from(self.good) / f64::from(self.total))
    }
}

pub fn accuracy_by_actor(verdicts: &[Verdict]) -> BTreeMap<String, Accuracy> {
    let mut out: BTreeMap<String, Accuracy> = BTreeMap::new();
    for v in verdicts {
        out.entry(v.actor.clone()).or_default().add(v.is_top_action);
    }
    out
}
