use rand::Rng;
use serde::{Deserialize, Serialize};

const Z95: f64 = 1.96;

/// Hands and chips for one contestant, overall or in one seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStats {
    pub hands: u32,
    pub wins: u32,
    pub net_chips: i64,
}

impl SeatStats {
    pub fn record(&mut self, delta: i64) {
        self.hands += 1;
        self.net_chips += delta;
        if delta > 0 {
            self.wins += 1;
        }
    }

    /// Big blinds won per 100 hands.
    pub fn bb_per_100(&self, bb: u32) -> f64 {
        if self.hands == 0 || bb == 0 {
            return 0.0;
        }
        self.net_chips as f64 / f64::from(bb) * 100.0 / f64::from(self.hands)
    }
}

/// Seat-split statistics for one contestant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestantStats {
    pub overall: SeatStats,
    pub small_blind: SeatStats,
    pub big_blind: SeatStats,
}

impl ContestantStats {
    pub fn record(&mut self, in_small_blind: bool, delta: i64) {
        self.overall.record(delta);
        if in_small_blind {
            self.small_blind.record(delta);
        } else {
            self.big_blind.record(delta);
        }
    }
}

/// Win/tie/loss tally of mirrored pairs from A's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    pub wins: u32,
    pub ties: u32,
    pub losses: u32,
}

impl PairRecord {
    pub fn record(&mut self, chips_a: i64) {
        match chips_a.signum() {
            1 => self.wins += 1,
            -1 => self.losses += 1,
            _ => self.ties += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.wins + self.ties + self.losses
    }

    pub fn wilson_ci95(&self) -> (f64, f64) {
        wilson_ci95(self.wins, self.ties, self.total())
    }
}

/// 95% Wilson score interval for a win rate where ties count half.
/// An empty sample gives `(0, 1)`.
pub fn wilson_ci95(wins: u32, ties: u32, total: u32) -> (f64, f64) {
    if total == 0 {
        return (0.0, 1.0);
    }
    let n = f64::from(total);
    let p = (f64::from(wins) + 0.5 * f64::from(ties)) / n;
    let z2 = Z95 * Z95;
    let denom = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denom;
    let half = Z95 * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    ((centre - half).max(0.0), (centre + half).min(1.0))
}

/// 95% percentile-bootstrap interval for the mean of `values`.
/// Returns `None` for an empty sample or zero resamples.
pub fn bootstrap_ci95<R: Rng + ?Sized>(values: &[f64], resamples: usize, rng: &mut R) -> Option<(f64, f64)> {
    if values.is_empty() || resamples == 0 {
        return None;
    }
    let n = values.len();
    let mut means: Vec<f64> = (0..resamples)
        .map(|_| (0..n).map(|_| values[rng.random_range(0..n)]).sum::<f64>() / n as f64)
        .collect();
    means.sort_by(f64::total_cmp);
    let at = |q: f64| means[((q * (resamples - 1) as f64).round() as usize).min(resamples - 1)];
    Some((at(0.025), at(0.975)))
}
