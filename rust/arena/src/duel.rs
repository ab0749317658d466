use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use duelbench_ai::policy::{fallback_action, validate, ProbePolicy};
use duelbench_ai::{create_agent, Agent, AgentError};
use duelbench_engine::cards::Card;
use duelbench_engine::engine::Engine;
use duelbench_engine::game::{GameConfig, HandOutcome};
use duelbench_engine::logger::{ActionLogRow, HandLogger};
use duelbench_engine::observation::Observation;
use duelbench_engine::player::{PlayerAction, Seat};

use crate::config::ArenaConfig;
use crate::report::ActionTally;
use crate::stop::StopToken;
use crate::store::Recorder;
use crate::{ArenaError, DecisionError};

/// A named agent entered into a match.
#[derive(Clone)]
pub struct Contestant {
    pub name: String,
    pub agent: Arc<dyn Agent>,
}

impl fmt::Debug for Contestant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contestant")
            .field("name", &self.name)
            .field("agent", &self.agent.name())
            .finish()
    }
}

impl Contestant {
    pub fn new(name: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        Self {
            name: name.into(),
            agent,
        }
    }

    /// Named after the agent itself.
    pub fn from_agent(agent: impl Agent + 'static) -> Self {
        let name = agent.name().to_string();
        Self::new(name, Arc::new(agent))
    }

    /// One of [`duelbench_ai::AGENT_KINDS`].
    pub fn builtin(kind: &str, seed: u64) -> Result<Self, AgentError> {
        let agent: Arc<dyn Agent> = Arc::from(create_agent(kind, seed)?);
        Ok(Self::new(agent.name().to_string(), agent))
    }
}

/// Asks `agent` for a move and validates it. The call is bounded by
/// `timeout` and dropped as soon as an immediate stop is requested.
pub async fn decide_with_timeout(
    agent: &dyn Agent,
    obs: &Observation,
    timeout: Duration,
    stop: &StopToken,
) -> Result<PlayerAction, DecisionError> {
    let reply = tokio::select! {
        biased;
        _ = stop.immediate() => return Err(DecisionError::Canceled),
        res = tokio::time::timeout(timeout, agent.decide(obs)) => match res {
            Ok(reply) => reply?,
            Err(_) => return Err(DecisionError::Timeout(timeout.as_millis() as u64)),
        },
    };
    Ok(validate(obs, &reply)?)
}

/// A finished hand as seen from contestant A.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSummary {
    pub hand_id: String,
    pub a_seat: Seat,
    pub outcome: HandOutcome,
    pub board: Vec<Card>,
    /// `[SB, BB]`
    pub holes: [[Card; 2]; 2],
    pub actions: usize,
}

impl HandSummary {
    pub fn delta_a(&self) -> i64 {
        self.outcome.delta(self.a_seat)
    }
}

/// Both hands of one deck: A in the small blind, then A in the big blind.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSummary {
    pub index: u32,
    pub seed: u64,
    pub hands: [HandSummary; 2],
}

impl PairSummary {
    pub fn chips_a(&self) -> i64 {
        self.hands.iter().map(HandSummary::delta_a).sum()
    }

    pub fn pot_sum(&self) -> u32 {
        self.hands.iter().map(|h| h.outcome.pot).sum()
    }

    /// Same hole cards per seat and the same board wherever both hands
    /// dealt one.
    pub fn mirrored(&self) -> bool {
        let [x, y] = &self.hands;
        let n = x.board.len().min(y.board.len());
        x.holes == y.holes && x.board[..n] == y.board[..n]
    }
}

/// Plays hands between two contestants and logs every applied action.
/// Index 0 is contestant A.
pub struct Duel<'a> {
    match_id: String,
    tag: String,
    game: GameConfig,
    timeout: Duration,
    contestants: [&'a Contestant; 2],
    stop: StopToken,
    probe: Option<ProbePolicy>,
    rng: ChaCha8Rng,
    recorder: Recorder<'a>,
    history: Option<&'a mut HandLogger>,
    seq: u64,
    rows: Vec<ActionLogRow>,
    tallies: [ActionTally; 2],
    fallbacks: [u32; 2],
}

impl<'a> Duel<'a> {
    pub fn new(
        match_id: impl Into<String>,
        config: &ArenaConfig,
        contestants: [&'a Contestant; 2],
        stop: StopToken,
        recorder: Recorder<'a>,
        probe_seed: u64,
    ) -> Self {
        let match_id = match_id.into();
        let tag: String = match_id.chars().take(8).collect();
        Self {
            match_id,
            tag,
            game: config.game(),
            timeout: config.decision_timeout(),
            contestants,
            stop,
            probe: config.probe_probability.map(ProbePolicy::new),
            rng: ChaCha8Rng::seed_from_u64(probe_seed),
            recorder,
            history: None,
            seq: 0,
            rows: Vec::new(),
            tallies: [ActionTally::default(); 2],
            fallbacks: [0; 2],
        }
    }

    /// Also write every finished hand to a JSONL history.
    pub fn with_history(mut self, history: Option<&'a mut HandLogger>) -> Self {
        self.history = history;
        self
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn stop(&self) -> &StopToken {
        &self.stop
    }

    pub fn recorder(&mut self) -> &mut Recorder<'a> {
        &mut self.recorder
    }

    /// Rows logged so far, including ones the store may have missed.
    pub fn rows(&self) -> &[ActionLogRow] {
        &self.rows
    }

    pub fn tallies(&self) -> [ActionTally; 2] {
        self.tallies
    }

    pub fn fallbacks(&self) -> [u32; 2] {
        self.fallbacks
    }

    /// Plays the mirrored pair for `seed`. `None` when an immediate stop
    /// cut it short; nothing from an unfinished pair is paid out.
    pub async fn play_pair(&mut self, index: u32, seed: u64) -> Result<Option<PairSummary>, ArenaError> {
        let Some(first) = self.play_hand(index, 'A', seed, Seat::SmallBlind).await? else {
            return Ok(None);
        };
        let Some(second) = self.play_hand(index, 'B', seed, Seat::BigBlind).await? else {
            return Ok(None);
        };
        let pair = PairSummary {
            index,
            seed,
            hands: [first, second],
        };
        if !pair.mirrored() {
            tracing::warn!(pair = index, seed, "mirrored hands were dealt different cards");
        }
        Ok(Some(pair))
    }

    /// Plays one hand with contestant A in `a_seat`.
    pub async fn play_hand(
        &mut self,
        pair_index: u32,
        label: char,
        seed: u64,
        a_seat: Seat,
    ) -> Result<Option<HandSummary>, ArenaError> {
        let hand_id = format!("{}-{:04}{}", self.tag, pair_index, label);
        let mut engine = Engine::from_seed(hand_id.clone(), self.game, seed)?;

        while let Some(seat) = engine.to_act() {
            if self.stop.is_immediate() {
                tracing::info!(%hand_id, "immediate stop, dropping hand");
                return Ok(None);
            }
            let obs = engine.observation()?;
            let who = usize::from(seat != a_seat);
            let contestant = self.contestants[who];

            let decided =
                decide_with_timeout(contestant.agent.as_ref(), &obs, self.timeout, &self.stop).await;
            let (chosen, fallback) = match decided {
                Ok(action) => (action, false),
                Err(DecisionError::Canceled) => {
                    tracing::info!(%hand_id, contestant = %contestant.name, "decision canceled, dropping hand");
                    return Ok(None);
                }
                Err(err) => {
                    let action = fallback_action(&obs);
                    tracing::warn!(%hand_id, contestant = %contestant.name, %err, ?action, "reply replaced by fallback");
                    (action, true)
                }
            };
            let action = match self.probe {
                Some(policy) => policy.apply_with(chosen, &obs, &mut self.rng),
                None => chosen,
            };

            let row = self.log_row(&engine, &obs, pair_index, who, action, fallback);
            engine.apply(action)?;
            self.tallies[who].record(action.kind());
            if fallback {
                self.fallbacks[who] += 1;
            }
            self.recorder.append_action(&row);
            self.rows.push(row);
            self.seq += 1;
        }

        let outcome = engine.outcome()?;
        tracing::debug!(%hand_id, winner = ?outcome.winner, pot = outcome.pot, "hand settled");
        self.write_history(&engine, &outcome, pair_index, a_seat);

        Ok(Some(HandSummary {
            hand_id,
            a_seat,
            board: engine.board().to_vec(),
            holes: [
                engine.player(Seat::SmallBlind).hole_cards(),
                engine.player(Seat::BigBlind).hole_cards(),
            ],
            actions: engine.history().len(),
            outcome,
        }))
    }

    fn log_row(
        &self,
        engine: &Engine,
        obs: &Observation,
        pair_index: u32,
        who: usize,
        action: PlayerAction,
        fallback: bool,
    ) -> ActionLogRow {
        let sb = engine.player(Seat::SmallBlind);
        let bb = engine.player(Seat::BigBlind);
        ActionLogRow {
            match_id: self.match_id.clone(),
            seq: self.seq,
            pair_index,
            hand_id: obs.hand_id.clone(),
            actor: self.contestants[who].name.clone(),
            seat: obs.seat,
            street: obs.street,
            action: action.kind(),
            amount: action.amount(),
            fallback,
            pot: obs.pot,
            current_bet: engine.current_bet(),
            to_call: obs.to_call,
            min_raise_to: obs.min_raise_to,
            max_raise_to: obs.max_raise_to,
            stacks: [sb.stack(), bb.stack()],
            board: obs.board.clone(),
            holes: [sb.hole_cards(), bb.hole_cards()],
        }
    }

    fn write_history(&mut self, engine: &Engine, outcome: &HandOutcome, pair_index: u32, a_seat: Seat) {
        let Some(logger) = self.history.as_deref_mut() else {
            return;
        };
        let [a, b] = self.contestants;
        let (sb, bb) = if a_seat == Seat::SmallBlind { (a, b) } else { (b, a) };
        let mut record = engine.hand_record(Some(outcome));
        record.seats = vec![sb.name.clone(), bb.name.clone()];
        record.meta = Some(serde_json::json!({
            "match_id": self.match_id,
            "pair_index": pair_index,
            "a_seat": a_seat,
        }));
        if let Err(err) = logger.write(&record) {
            tracing::warn!(%err, "hand history write failed, history disabled");
            self.history = None;
        }
    }
}
