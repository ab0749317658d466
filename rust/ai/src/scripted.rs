use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{Agent, AgentError, Decision};
use duelbench_engine::observation::Observation;

/// One scripted response.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(Decision),
    /// Reply with a transport failure.
    Fail(String),
    /// Sleep before replying with the wrapped step; used to trip deadlines.
    Stall(Duration, Box<Step>),
}

/// Replays a fixed script, then plays passively (check, else call) once the
/// script runs out.
#[derive(Debug)]
pub struct ScriptedAgent {
    name: String,
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<Observation>>,
}

impl ScriptedAgent {
    pub fn new(name: impl Into<String>, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            name: name.into(),
            steps: Mutex::new(steps.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Never folds, never raises.
    pub fn calling_station() -> Self {
        Self::new("CallingStation", [])
    }

    /// Shorthand for a script of plain replies such as `["fold", "call"]`.
    pub fn replies(name: &str, actions: &[&str]) -> Self {
        Self::new(
            name,
            actions.iter().map(|a| Step::Reply(Decision::new(*a))),
        )
    }

    /// Observations received so far.
    pub fn observations(&self) -> Vec<Observation> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }

    fn next_step(&self) -> Option<Step> {
        self.steps.lock().ok().and_then(|mut q| q.pop_front())
    }
}

fn passive(obs: &Observation) -> Decision {
    if obs.to_call == 0 {
        Decision::new("check")
    } else {
        Decision::new("call")
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn decide(&self, obs: &Observation) -> Result<Decision, AgentError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(obs.clone());
        }
        let mut step = match self.next_step() {
            Some(step) => step,
            None => return Ok(passive(obs)),
        };
        loop {
            match step {
                Step::Reply(d) => return Ok(d),
                Step::Fail(msg) => return Err(AgentError::Transport(msg)),
                Step::Stall(delay, then) => {
                    tokio::time::sleep(delay).await;
                    step = *then;
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelbench_engine::engine::Engine;
    use duelbench_engine::game::GameConfig;

    #[tokio::test]
    async fn script_then_passive() {
        let obs = Engine::from_seed("s-0A", GameConfig::default(), 1)
            .unwrap()
            .observation()
            .unwrap();
        let agent = ScriptedAgent::new(
            "s",
            [
                Step::Reply(Decision::new("fold")),
                Step::Fail("boom".into()),
            ],
        );
        assert_eq!(agent.decide(&obs).await, Ok(Decision::new("fold")));
        assert_eq!(agent.decide(&obs).await, Err(AgentError::Transport("boom".into())));
        assert_eq!(agent.decide(&obs).await, Ok(Decision::new("call")));
        assert_eq!(agent.observations().len(), 3);
    }
}
