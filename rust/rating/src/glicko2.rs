//! Glicko-2 rating periods.
//!
//! Ratings are stored on the familiar 1500-centred scale and converted to
//! the internal μ/φ scale (divide by 173.7178) for each update. `g`, `v` and
//! `Δ` carry the factor `q = ln 10 / 400`. The new volatility is the root of
//! Glickman's `f(x)`, found with the Illinois variant of regula falsi.

use std::f64::consts::{LN_10, PI};

use serde::{Deserialize, Serialize};

use crate::{check_score, RatingError};

pub const SCALE: f64 = 173.7178;
pub const DEFAULT_RATING: f64 = 1500.0;
pub const DEFAULT_RD: f64 = 350.0;
pub const DEFAULT_VOLATILITY: f64 = 0.06;
pub const DEFAULT_TAU: f64 = 0.5;

const CONVERGENCE: f64 = 1e-6;
const MAX_ITERATIONS: u32 = 100;
const MAX_BRACKET_STEPS: u32 = 100;
const DEGENERATE_DELTA: f64 = 1e-12;
const Q: f64 = LN_10 / 400.0;

/// One game against an opponent, with the opponent's pre-period rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub opponent_rating: f64,
    pub opponent_rd: f64,
    /// 1 win, 0 loss, anything between for partial results.
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glicko2 {
    pub rating: f64,
    pub rd: f64,
    pub volatility: f64,
    #[serde(default)]
    pub games: u32,
}

impl Default for Glicko2 {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING,
            rd: DEFAULT_RD,
            volatility: DEFAULT_VOLATILITY,
            games: 0,
        }
    }
}

fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * Q * Q * phi * phi / (PI * PI)).sqrt()
}

fn expect(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

impl Glicko2 {
    pub fn new(rating: f64, rd: f64, volatility: f64) -> Self {
        Self {
            rating,
            rd,
            volatility,
            games: 0,
        }
    }

    pub fn mu(&self) -> f64 {
        (self.rating - DEFAULT_RATING) / SCALE
    }

    pub fn phi(&self) -> f64 {
        self.rd / SCALE
    }

    /// Rating period with no games: deviation grows, rating stays. The
    /// idle period still counts toward `games`.
    pub fn age(&mut self) {
        let phi = self.phi();
        let phi_star = (phi * phi + self.volatility * self.volatility).sqrt();
        self.rd = phi_star * SCALE;
        self.games += 1;
    }

    /// Applies one rating period. An empty batch ages the rating. On error
    /// the rating is left untouched.
    pub fn update(&mut self, results: &[Outcome], tau: f64) -> Result<(), RatingError> {
        if !(tau > 0.0 && tau.is_finite()) {
            return Err(RatingError::InvalidParameter(format!("tau must be positive, got {tau}")));
        }
        if results.is_empty() {
            self.age();
            return Ok(());
        }
        for r in results {
            check_score(r.score)?;
        }

        let mu = self.mu();
        let phi = self.phi();
        let mut sum_g2e = 0.0;
        let mut sum_gse = 0.0;
        for r in results {
            let mu_j = (r.opponent_rating - DEFAULT_RATING) / SCALE;
            let phi_j = r.opponent_rd / SCALE;
            let gj = g(phi_j);
            let e = expect(mu, mu_j, phi_j);
            sum_g2e += gj * gj * e * (1.0 - e);
            sum_gse += gj * (r.score - e);
        }
        let v = 1.0 / (Q * Q * sum_g2e);
        let delta = v * Q * sum_gse;

        let sigma = if delta.abs() < DEGENERATE_DELTA {
            tracing::debug!(delta, "negligible rating evidence, keeping volatility");
            self.volatility
        } else {
            solve_volatility(delta, phi, v, self.volatility, tau)?
        };

        let phi_star = (phi * phi + sigma * sigma).sqrt();
        let phi_new = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let mu_new = mu + phi_new * phi_new * Q * sum_gse;

        self.rating = mu_new * SCALE + DEFAULT_RATING;
        self.rd = phi_new * SCALE;
        self.volatility = sigma;
        self.games += results.len() as u32;
        Ok(())
    }

    /// Updates both sides of a single game from their pre-game ratings.
    /// Neither rating changes unless both updates succeed.
    pub fn update_pair(a: &mut Glicko2, b: &mut Glicko2, score_a: f64, tau: f64) -> Result<(), RatingError> {
        let score_a = check_score(score_a)?;
        let (old_a, old_b) = (*a, *b);
        let mut next_a = old_a;
        let mut next_b = old_b;
        next_a.update(
            &[Outcome {
                opponent_rating: old_b.rating,
                opponent_rd: old_b.rd,
                score: score_a,
            }],
            tau,
        )?;
        next_b.update(
            &[Outcome {
                opponent_rating: old_a.rating,
                opponent_rd: old_a.rd,
                score: 1.0 - score_a,
            }],
            tau,
        )?;
        *a = next_a;
        *b = next_b;
        Ok(())
    }
}

/// Score in `[0, 1]` from a chip margin, squashed by `tanh(chips / scale)`.
pub fn score_from_margin(chips: i64, scale: f64) -> f64 {
    if scale <= 0.0 {
        return 0.5;
    }
    0.5 + 0.5 * (chips as f64 / scale).tanh()
}

/// Share of points from wins and ties; 0.5 when nothing was played.
pub fn score_from_results(wins: u32, ties: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.5;
    }
    (f64::from(wins) + 0.5 * f64::from(ties)) / f64::from(total)
}

fn solve_volatility(delta: f64, phi: f64, v: f64, sigma: f64, tau: f64) -> Result<f64, RatingError> {
    let a = (sigma * sigma).ln();
    let phi2 = phi * phi;
    let f = |x: f64| {
        let ex = x.exp();
        let num = ex * (delta * delta - phi2 - v - ex);
        let den = 2.0 * (phi2 + v + ex).powi(2);
        num / den - (x - a) / (tau * tau)
    };

    let mut lo = a;
    let mut hi = if delta * delta > phi2 + v {
        (delta * delta - phi2 - v).ln()
    } else {
        // step outward, doubling, until f changes sign
        let mut k = 1.0;
        let mut steps = 0;
        while f(a - k) < 0.0 {
            steps += 1;
            if steps > MAX_BRACKET_STEPS {
                return Err(RatingError::VolatilityDidNotConverge { iterations: steps });
            }
            k *= 2.0;
        }
        a - k
    };

    let mut f_lo = f(lo);
    let mut f_hi = f(hi);
    let mut iterations = 0;
    while (hi - lo).abs() > CONVERGENCE {
        iterations += 1;
        if iterations > MAX_ITERATIONS || !(f_lo.is_finite() && f_hi.is_finite()) {
            return Err(RatingError::VolatilityDidNotConverge { iterations });
        }
        let c = lo + (lo - hi) * f_lo / (f_hi - f_lo);
        let f_c = f(c);
        if f_c * f_hi <= 0.0 {
            lo = hi;
            f_lo = f_hi;
        } else {
            f_lo /= 2.0;
        }
        hi = c;
        f_hi = f_c;
    }
    Ok((lo / 2.0).exp())
}
