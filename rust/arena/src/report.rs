use std::fmt;

use serde::{Deserialize, Serialize};

use duelbench_engine::rules::ActionKind;
use duelbench_judge::Accuracy;
use duelbench_rating::stats::{ContestantStats, PairRecord};
use duelbench_rating::Glicko2;

/// How a match ended. Only [`MatchEnd::Completed`],
/// [`MatchEnd::StoppedGracefully`] and [`MatchEnd::BankBusted`] count as
/// results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEnd {
    Completed,
    StoppedGracefully,
    /// Immediate stop; the in-flight hand was dropped without payout.
    Aborted,
    BankBusted { contestant: String },
    EngineFault { detail: String },
}

impl MatchEnd {
    pub fn is_result(&self) -> bool {
        matches!(
            self,
            MatchEnd::Completed | MatchEnd::StoppedGracefully | MatchEnd::BankBusted { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchEnd::Completed => "completed",
            MatchEnd::StoppedGracefully => "stopped_gracefully",
            MatchEnd::Aborted => "aborted",
            MatchEnd::BankBusted { .. } => "bank_busted",
            MatchEnd::EngineFault { .. } => "engine_fault",
        }
    }
}

impl fmt::Display for MatchEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchEnd::BankBusted { contestant } => write!(f, "bank_busted ({contestant})"),
            MatchEnd::EngineFault { detail } => write!(f, "engine_fault ({detail})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Applied actions by kind for one contestant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTally {
    pub checks: u32,
    pub calls: u32,
    pub raises: u32,
    pub folds: u32,
}

impl ActionTally {
    pub fn record(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Check => self.checks += 1,
            ActionKind::Call => self.calls += 1,
            ActionKind::Raise => self.raises += 1,
            ActionKind::Fold => self.folds += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.checks + self.calls + self.raises + self.folds
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestantReport {
    pub name: String,
    /// Starting stack plus net chips over the match.
    pub bank: i64,
    /// Hands won outright.
    pub wins: u32,
    pub stats: ContestantStats,
    pub tally: ActionTally,
    /// Replies replaced by the fallback ladder.
    pub fallbacks: u32,
    pub elo: f64,
    pub glicko: Glicko2,
    /// Judge grades for this match.
    pub accuracy: Accuracy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub match_id: String,
    pub base_seed: u64,
    pub end: MatchEnd,
    pub pairs_played: u32,
    pub hands_played: u32,
    /// `[A, B]`
    pub contestants: [ContestantReport; 2],
    /// Pair results from A's side.
    pub pairs: PairRecord,
    pub pair_win_ci95: (f64, f64),
    /// Bootstrap interval of A's mean pair margin, in big blinds.
    pub margin_ci95_bb: Option<(f64, f64)>,
    pub verdicts: usize,
    pub persistence_degraded: bool,
}

impl MatchReport {
    /// Human-readable summary, one line per contestant.
    pub fn summary(&self, big_blind: u32) -> String {
        let mut out = format!(
            "match {} ({}): {} pairs, {} hands\n",
            self.match_id, self.end, self.pairs_played, self.hands_played
        );
        for c in &self.contestants {
            let acc = c
                .accuracy
                .rate()
                .map(|r| format!("{:.1}%", r * 100.0))
                .unwrap_or_else(|| "n/a".into());
            out.push_str(&format!(
                "  {:<16} bank {:>7}  wins {:>4}  {:>+8.1} bb/100  elo {:>7.1}  glicko {:>7.1} (rd {:>5.1})  judge {} fallbacks {}\n",
                c.name,
                c.bank,
                c.wins,
                c.stats.overall.bb_per_100(big_blind),
                c.elo,
                c.glicko.rating,
                c.glicko.rd,
                acc,
                c.fallbacks,
            ));
        }
        out.push_str(&format!(
            "  pairs W/T/L {}/{}/{}  win rate 95% CI [{:.3}, {:.3}]",
            self.pairs.wins, self.pairs.ties, self.pairs.losses, self.pair_win_ci95.0, self.pair_win_ci95.1
        ));
        if let Some((lo, hi)) = self.margin_ci95_bb {
            out.push_str(&format!("  margin 95% CI [{lo:.2}, {hi:.2}] bb/pair"));
        }
        if self.persistence_degraded {
            out.push_str("\n  warning: persistence degraded, logs incomplete");
        }
        out
    }
}

/// Career position after a round robin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub glicko: Glicko2,
    pub matches: u32,
    pub net_chips: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixReport {
    pub matches: Vec<MatchReport>,
    /// Sorted by Glicko rating, best first.
    pub standings: Vec<Standing>,
    /// True when the round robin was cut short by a stop or a fault.
    pub interrupted: bool,
}
