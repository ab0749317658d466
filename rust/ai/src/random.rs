use std::sync::Mutex;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Agent, AgentError, Decision};
use duelbench_engine::observation::Observation;
use duelbench_engine::rules::ActionKind;

/// Picks uniformly among legal actions; raises pick a uniform raise-to.
/// Seeded, so a run replays exactly.
#[derive(Debug)]
pub struct RandomAgent {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl Agent for RandomAgent {
    async fn decide(&self, obs: &Observation) -> Result<Decision, AgentError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AgentError::Transport("rng lock poisoned".into()))?;
        let kind = obs
            .legal_actions
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| AgentError::Malformed("no legal actions offered".into()))?;
        Ok(match kind {
            ActionKind::Raise => {
                Decision::raise_to(rng.random_range(obs.min_raise_to..=obs.max_raise_to))
            }
            other => Decision::new(other.as_str()),
        })
    }

    fn name(&self) -> &str {
        "RandomAgent"
    }
}
