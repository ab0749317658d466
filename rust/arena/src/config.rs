use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use duelbench_engine::game::{GameConfig, BIG_BLIND, SMALL_BLIND, STARTING_STACK};
use duelbench_judge::JudgeConfig;
use duelbench_rating::glicko2::DEFAULT_TAU;
use duelbench_rating::EloConfig;

use crate::stop::StopMode;
use crate::ArenaError;

pub const DEFAULT_PAIRS: u32 = 50;
pub const DEFAULT_DECISION_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_BOOTSTRAP_RESAMPLES: usize = 1_000;

/// When a running match should stop on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopConfig {
    /// Stop requests (signal, deadline, stop file) cancel the in-flight
    /// decision instead of finishing the current pair.
    pub immediate: bool,
    /// Wall-clock budget for the whole match.
    pub max_seconds: Option<u64>,
    /// Stop once this file exists.
    pub stop_file: Option<PathBuf>,
}

impl StopConfig {
    pub fn mode(&self) -> StopMode {
        if self.immediate {
            StopMode::Immediate
        } else {
            StopMode::Graceful
        }
    }
}

/// Everything a match needs besides the two contestants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub small_blind: u32,
    pub big_blind: u32,
    pub starting_stack: u32,
    /// Mirrored pairs per match; each pair is two hands.
    pub pairs: u32,
    /// Base seed for the deck seed stream. Drawn fresh when absent.
    pub seed: Option<u64>,
    pub elo: EloConfig,
    pub glicko_tau: f64,
    /// Exploration probability for unbet spots; disabled when absent.
    pub probe_probability: Option<f64>,
    pub decision_timeout_ms: u64,
    pub stop: StopConfig,
    pub judge: JudgeConfig,
    pub bootstrap_resamples: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            small_blind: SMALL_BLIND,
            big_blind: BIG_BLIND,
            starting_stack: STARTING_STACK,
            pairs: DEFAULT_PAIRS,
            seed: None,
            elo: EloConfig::default(),
            glicko_tau: DEFAULT_TAU,
            probe_probability: None,
            decision_timeout_ms: DEFAULT_DECISION_TIMEOUT_MS,
            stop: StopConfig::default(),
            judge: JudgeConfig::default(),
            bootstrap_resamples: DEFAULT_BOOTSTRAP_RESAMPLES,
        }
    }
}

impl ArenaConfig {
    pub fn game(&self) -> GameConfig {
        GameConfig {
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            starting_stack: self.starting_stack,
        }
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ArenaError> {
        self.game()
            .validate()
            .map_err(|e| ArenaError::Config(e.to_string()))?;
        if self.pairs == 0 {
            return Err(ArenaError::Config("pairs must be at least 1".into()));
        }
        if self.decision_timeout_ms == 0 {
            return Err(ArenaError::Config("decision timeout must be positive".into()));
        }
        if !(self.glicko_tau > 0.0 && self.glicko_tau.is_finite()) {
            return Err(ArenaError::Config(format!(
                "glicko tau must be positive, got {}",
                self.glicko_tau
            )));
        }
        if !(self.elo.k > 0.0 && self.elo.k.is_finite()) {
            return Err(ArenaError::Config(format!("elo k must be positive, got {}", self.elo.k)));
        }
        if let Some(p) = self.probe_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(ArenaError::Config(format!(
                    "probe probability must be within [0, 1], got {p}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.judge.fold_equity) || self.judge.bet_fraction <= 0.0 {
            return Err(ArenaError::Config("judge fold equity or bet fraction out of range".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ArenaConfig::default();
        config.validate().unwrap();
        assert_eq!(config.game(), GameConfig::default());
        assert_eq!(config.stop.mode(), StopMode::Graceful);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad = [
            ArenaConfig { pairs: 0, ..ArenaConfig::default() },
            ArenaConfig { big_blind: 0, ..ArenaConfig::default() },
            ArenaConfig { probe_probability: Some(1.5), ..ArenaConfig::default() },
            ArenaConfig { glicko_tau: 0.0, ..ArenaConfig::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(ArenaError::Config(_))));
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ArenaConfig = serde_json::from_str(r#"{"pairs": 3, "stop": {"immediate": true}}"#).unwrap();
        assert_eq!(config.pairs, 3);
        assert_eq!(config.big_blind, 100);
        assert_eq!(config.stop.mode(), StopMode::Immediate);
    }
}
