use serde::{Deserialize, Serialize};

use crate::{check_score, RatingError};

pub const DEFAULT_START: f64 = 1500.0;
pub const DEFAULT_K: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    pub start: f64,
    pub k: f64,
    /// Update after every hand instead of once per mirrored pair.
    pub per_hand: bool,
    /// Scale per-hand K by pot size.
    pub weight_by_pot: bool,
    /// Nudge pair scores toward the contestant with better judge accuracy.
    pub accuracy_bias: bool,
    /// Scale pair K by how lopsided the pair was.
    pub margin_factor: bool,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            k: DEFAULT_K,
            per_hand: false,
            weight_by_pot: false,
            accuracy_bias: true,
            margin_factor: false,
        }
    }
}

/// Rating change from one update. `b` is always exactly `-a`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloDelta {
    pub a: f64,
    pub b: f64,
}

/// Expected score of a player rated `ra` against one rated `rb`.
pub fn expected(ra: f64, rb: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rb - ra) / 400.0))
}

/// Head-to-head Elo state for contestants A and B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elo {
    pub a: f64,
    pub b: f64,
    pub games: u32,
    acc_a: f64,
    acc_b: f64,
    config: EloConfig,
}

impl Elo {
    pub fn new(config: EloConfig) -> Self {
        Self::with_ratings(config.start, config.start, config)
    }

    pub fn with_ratings(a: f64, b: f64, config: EloConfig) -> Self {
        Self {
            a,
            b,
            games: 0,
            acc_a: 0.5,
            acc_b: 0.5,
            config,
        }
    }

    pub fn config(&self) -> &EloConfig {
        &self.config
    }

    /// Judge accuracies in `[0, 1]`; out-of-range values are clamped and NaN
    /// reads as 0.5.
    pub fn set_accuracy(&mut self, acc_a: f64, acc_b: f64) {
        self.acc_a = clamp_accuracy(acc_a);
        self.acc_b = clamp_accuracy(acc_b);
    }

    pub fn accuracy(&self) -> (f64, f64) {
        (self.acc_a, self.acc_b)
    }

    pub fn expected_a(&self) -> f64 {
        expected(self.a, self.b)
    }

    /// One hand: `score_a` is 1 for an A win, 0 for a loss, 0.5 for a split.
    pub fn update_hand(&mut self, score_a: f64, pot: u32, bb: u32) -> Result<EloDelta, RatingError> {
        let score_a = check_score(score_a)?;
        let mut k = self.config.k * self.decay();
        if self.config.weight_by_pot {
            k *= pot_scale(pot, bb, 0.5, 3.0);
        }
        Ok(self.commit(k, score_a))
    }

    /// One mirrored pair: `chips_a` is A's net over both hands and `pot_sum`
    /// the two pots added together.
    pub fn update_pair(&mut self, chips_a: i64, pot_sum: u32, bb: u32) -> EloDelta {
        let norm = self.pair_margin(chips_a, pot_sum, bb);
        let score_a = 0.5 + 0.5 * norm;

        let avg_acc = (self.acc_a + self.acc_b) / 2.0;
        let confidence = (0.85 + 0.3 * avg_acc).clamp(0.75, 1.15);
        let mut k = self.config.k * pot_scale(pot_sum, bb, 0.6, 3.0) * confidence * self.decay();
        if self.config.margin_factor {
            k *= (0.75 + 0.5 * norm.abs()).clamp(0.75, 1.25);
        }
        self.commit(k, score_a)
    }

    /// Pair margin squashed into (-1, 1), including the accuracy bias.
    pub fn pair_margin(&self, chips_a: i64, pot_sum: u32, bb: u32) -> f64 {
        let denom = if pot_sum > 0 {
            f64::from(pot_sum)
        } else if bb > 0 {
            2.0 * f64::from(bb)
        } else {
            1.0
        };
        let scale = denom / 2.0;
        let mut norm = (chips_a as f64 / (scale * 1.4)).tanh();
        if self.config.accuracy_bias {
            norm += ((self.acc_a - self.acc_b) * 0.35).clamp(-0.2, 0.2);
        }
        norm.clamp(-0.999, 0.999)
    }

    fn decay(&self) -> f64 {
        1.0 / (1.0 + 0.01 * f64::from(self.games))
    }

    fn commit(&mut self, k: f64, score_a: f64) -> EloDelta {
        let d = k * (score_a - self.expected_a());
        self.a += d;
        self.b -= d;
        self.games += 1;
        EloDelta { a: d, b: -d }
    }
}

fn clamp_accuracy(acc: f64) -> f64 {
    if acc.is_nan() {
        0.5
    } else {
        acc.clamp(0.0, 1.0)
    }
}

fn pot_scale(pot: u32, bb: u32, lo: f64, hi: f64) -> f64 {
    if bb == 0 {
        return 1.0;
    }
    (f64::from(pot) / (2.0 * f64::from(bb))).clamp(lo, hi)
}
