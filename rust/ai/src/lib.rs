//! # duelbench-ai: Decision-Maker Contract
//!
//! Everything on the decision side of a duel: the [`Agent`] trait a
//! contestant implements, the wire reply it returns, reply validation and the
//! fallback and probe policies applied by the orchestrator.
//!
//! ## Core Components
//!
//! - [`Agent`] - Async interface for decision-making
//! - [`Decision`] - Wire-level reply (action name plus optional raise-to amount)
//! - [`policy`] - Reply validation, fallback ladder and probe policy
//! - [`baseline`] - Rule-based reference agent
//! - [`random`] - Seeded agent choosing uniformly among legal actions
//! - [`scripted`] - Agent replaying a fixed script, for tests and replays
//! - [`create_agent`] - Factory for the built-in agents
//!
//! ## Quick Start
//!
//! ```rust
//! use duelbench_ai::{create_agent, policy};
//! use duelbench_engine::engine::Engine;
//! use duelbench_engine::game::GameConfig;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let agent = create_agent("baseline", 7).unwrap();
//! let hand = Engine::from_seed("demo-0A", GameConfig::default(), 42).unwrap();
//! let obs = hand.observation().unwrap();
//!
//! let reply = agent.decide(&obs).await.unwrap();
//! let action = policy::validate(&obs, &reply).unwrap_or_else(|_| policy::fallback_action(&obs));
//! assert!(obs.can(action.kind()));
//! # });
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use duelbench_engine::observation::Observation;
use duelbench_engine::player::PlayerAction;

pub mod baseline;
pub mod policy;
pub mod random;
pub mod scripted;

/// Longest comment kept from a reply.
pub const MAX_COMMENT_LEN: usize = 120;

/// Reply from a decision-maker, as received on the wire. Nothing here is
/// trusted until [`policy::validate`] accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: String,
    /// Raise-to total; required for `raise`, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Decision {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            amount: None,
            comment: None,
        }
    }

    pub fn raise_to(amount: u32) -> Self {
        Self {
            action: "raise".into(),
            amount: Some(amount),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.chars().take(MAX_COMMENT_LEN).collect());
        self
    }
}

impl From<PlayerAction> for Decision {
    fn from(action: PlayerAction) -> Self {
        match action {
            PlayerAction::Raise(to) => Decision::raise_to(to),
            other => Decision::new(other.kind().as_str()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed reply: {0}")]
    Malformed(String),
    #[error("unknown agent kind: {0}")]
    UnknownAgent(String),
}

/// A contestant. Implementations only see the [`Observation`] for their seat
/// and may take as long as they like; the orchestrator enforces deadlines.
///
/// # Example Implementation
///
/// ```rust
/// use async_trait::async_trait;
/// use duelbench_ai::{Agent, AgentError, Decision};
/// use duelbench_engine::observation::Observation;
///
/// struct AlwaysCall;
///
/// #[async_trait]
/// impl Agent for AlwaysCall {
///     async fn decide(&self, _obs: &Observation) -> Result<Decision, AgentError> {
///         Ok(Decision::new("call"))
///     }
///
///     fn name(&self) -> &str {
///         "AlwaysCall"
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    async fn decide(&self, obs: &Observation) -> Result<Decision, AgentError>;

    fn name(&self) -> &str;
}

/// Built-in agent kinds accepted by [`create_agent`].
pub const AGENT_KINDS: [&str; 3] = ["baseline", "random", "station"];

/// Creates a built-in agent. `seed` drives agents that randomize.
///
/// # Example
///
/// ```rust
/// use duelbench_ai::create_agent;
///
/// let ai = create_agent("baseline", 0).unwrap();
/// assert_eq!(ai.name(), "BaselineAgent");
/// assert!(create_agent("oracle", 0).is_err());
/// ```
pub fn create_agent(kind: &str, seed: u64) -> Result<Box<dyn Agent>, AgentError> {
    match kind {
        "baseline" => Ok(Box::new(baseline::BaselineAgent::new())),
        "random" => Ok(Box::new(random::RandomAgent::new(seed))),
        "station" => Ok(Box::new(scripted::ScriptedAgent::calling_station())),
        other => Err(AgentError::UnknownAgent(other.to_string())),
    }
}
