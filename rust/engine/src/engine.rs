use std::cmp::Ordering;

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{Ending, GameConfig, HandOutcome};
use crate::hand::{evaluate_hand, raw_score, HandStrength};
use crate::logger::{ActionRecord, HandRecord, ShowdownInfo, Street};
use crate::observation::{Blinds, Observation, Stacks};
use crate::player::{Player, PlayerAction, Seat};
use crate::pot::{settle, uncalled};
use crate::rules::{self, validate_action, ActionKind, RaiseBounds};

/// Upper bound on actions within one street. Reaching it force-closes the
/// street.
pub const MAX_ACTIONS_PER_STREET: u32 = 20;

/// What an applied action did to the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same street, the other seat acts next.
    Continue,
    /// Betting round closed and the given street was dealt.
    NextStreet(Street),
    /// Hand is over; call [`Engine::outcome`].
    Complete,
}

/// Heads-up betting state machine for a single hand.
///
/// Created with blinds posted and hole cards dealt; driven to completion by
/// [`Engine::apply`]. The small blind is seat index 0.
#[derive(Debug, Clone)]
pub struct Engine {
    id: String,
    seed: Option<u64>,
    config: GameConfig,
    deck: Deck,
    board: Vec<Card>,
    street: Street,
    current_bet: u32,
    min_raise: u32,
    players: [Player; 2],
    to_act: Seat,
    street_actions: u32,
    history: Vec<ActionRecord>,
    ending: Option<Ending>,
}

impl Engine {
    /// Starts a hand from `deck`. Hole cards come off the front, small blind
    /// first.
    pub fn new(id: impl Into<String>, config: GameConfig, mut deck: Deck) -> Result<Self, GameError> {
        config.validate()?;
        let sb_hole = [deck.deal_card()?, deck.deal_card()?];
        let bb_hole = [deck.deal_card()?, deck.deal_card()?];
        let mut players = [
            Player::new(Seat::SmallBlind, config.starting_stack, sb_hole),
            Player::new(Seat::BigBlind, config.starting_stack, bb_hole),
        ];
        players[0].commit(config.small_blind);
        players[1].commit(config.big_blind);
        let current_bet = players[0].committed().max(players[1].committed());

        let mut engine = Self {
            id: id.into(),
            seed: None,
            config,
            deck,
            board: Vec::with_capacity(5),
            street: Street::Preflop,
            current_bet,
            min_raise: config.big_blind,
            players,
            to_act: Seat::SmallBlind,
            street_actions: 0,
            history: Vec::new(),
            ending: None,
        };
        // a blind can put a short stack all-in before anyone acts
        if engine.round_closed() {
            engine.close_round()?;
        }
        Ok(engine)
    }

    /// Starts a hand from a freshly shuffled deck for `seed`.
    pub fn from_seed(id: impl Into<String>, config: GameConfig, seed: u64) -> Result<Self, GameError> {
        let mut engine = Self::new(id, config, Deck::shuffled(seed))?;
        engine.seed = Some(seed);
        Ok(engine)
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn board(&self) -> &[Card] {
        &self.board
    }
    pub fn street(&self) -> Street {
        self.street
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn min_raise(&self) -> u32 {
        self.min_raise
    }
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }
    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }
    pub fn is_complete(&self) -> bool {
        self.ending.is_some()
    }

    pub fn pot(&self) -> u32 {
        self.players.iter().map(Player::invested).sum()
    }

    /// Seat to act, `None` once the hand is over.
    pub fn to_act(&self) -> Option<Seat> {
        match self.ending {
            Some(_) => None,
            None => Some(self.to_act),
        }
    }

    pub fn to_call(&self) -> u32 {
        self.current_bet
            .saturating_sub(self.players[self.to_act.index()].committed())
    }

    pub fn raise_bounds(&self) -> RaiseBounds {
        let p = &self.players[self.to_act.index()];
        RaiseBounds::new(self.current_bet, self.min_raise, p.committed(), p.stack())
    }

    pub fn legal_actions(&self) -> Vec<ActionKind> {
        if self.ending.is_some() {
            return Vec::new();
        }
        let p = &self.players[self.to_act.index()];
        let opp = &self.players[self.to_act.other().index()];
        if p.is_folded() || p.is_all_in() {
            return Vec::new();
        }
        rules::legal_actions(
            self.to_call(),
            opp.is_all_in(),
            p.stack(),
            p.committed(),
            self.current_bet,
        )
    }

    /// Projection for the seat to act.
    pub fn observation(&self) -> Result<Observation, GameError> {
        if self.ending.is_some() {
            return Err(GameError::HandComplete);
        }
        let hero = &self.players[self.to_act.index()];
        let villain = &self.players[self.to_act.other().index()];
        let bounds = self.raise_bounds();
        Ok(Observation {
            hand_id: self.id.clone(),
            seat: self.to_act,
            street: self.street,
            hole_cards: hero.hole_cards(),
            board: self.board.clone(),
            stacks: Stacks {
                hero: hero.stack(),
                villain: villain.stack(),
            },
            blinds: Blinds {
                sb: self.config.small_blind,
                bb: self.config.big_blind,
            },
            pot: self.pot(),
            to_call: self.to_call(),
            min_raise_to: bounds.min_to,
            max_raise_to: bounds.max_to,
            legal_actions: self.legal_actions(),
            history_len: self.history.len(),
        })
    }

    /// Applies `action` for the seat to act. On error the hand is unchanged.
    pub fn apply(&mut self, action: PlayerAction) -> Result<Transition, GameError> {
        if self.ending.is_some() {
            return Err(GameError::HandComplete);
        }
        let action = validate_action(&self.legal_actions(), self.raise_bounds(), action)?;
        let seat = self.to_act;
        let owed = self.to_call();
        let me = seat.index();

        match action {
            PlayerAction::Fold => self.players[me].fold(),
            PlayerAction::Check => {}
            PlayerAction::Call => {
                self.players[me].commit(owed);
            }
            PlayerAction::Raise(to) => {
                let prev = self.current_bet;
                let add = to - self.players[me].committed();
                self.players[me].commit(add);
                self.current_bet = to;
                self.min_raise = to - prev;
                self.players[seat.other().index()].set_acted(false);
            }
        }
        self.players[me].set_acted(true);
        self.history.push(ActionRecord {
            seat,
            street: self.street,
            action,
        });
        self.street_actions += 1;
        self.to_act = seat.other();
        tracing::debug!(hand_id = %self.id, %seat, street = %self.street, ?action, pot = self.pot(), "applied action");

        self.advance()
    }

    fn advance(&mut self) -> Result<Transition, GameError> {
        if self.players.iter().any(Player::is_folded) {
            self.ending = Some(Ending::Fold);
            return Ok(Transition::Complete);
        }
        if !self.round_closed() {
            if self.street_actions < MAX_ACTIONS_PER_STREET {
                return Ok(Transition::Continue);
            }
            tracing::warn!(hand_id = %self.id, street = %self.street, "street action cap reached, closing street");
            self.refund_uncalled();
        }
        self.close_round()
    }

    // Nobody owes chips, and either both have acted since the last raise or
    // someone is all-in.
    fn round_closed(&self) -> bool {
        let [a, b] = &self.players;
        if a.is_folded() || b.is_folded() {
            return true;
        }
        let owes = |p: &Player| !p.is_all_in() && p.committed() < self.current_bet;
        if owes(a) || owes(b) {
            return false;
        }
        if a.is_all_in() || b.is_all_in() {
            return true;
        }
        a.has_acted() && b.has_acted()
    }

    fn close_round(&mut self) -> Result<Transition, GameError> {
        let all_in = self.players.iter().any(Player::is_all_in);
        if self.street == Street::River || all_in {
            self.refund_uncalled();
            while self.board.len() < 5 {
                self.board.push(self.deck.deal_card()?);
            }
            self.ending = Some(Ending::Showdown);
            return Ok(Transition::Complete);
        }
        self.next_street()?;
        Ok(Transition::NextStreet(self.street))
    }

    fn next_street(&mut self) -> Result<(), GameError> {
        let next = self.street.next().ok_or(GameError::HandComplete)?;
        while self.board.len() < next.board_len() {
            self.board.push(self.deck.deal_card()?);
        }
        self.street = next;
        self.current_bet = 0;
        self.min_raise = self.config.big_blind;
        self.street_actions = 0;
        for p in &mut self.players {
            p.start_street();
        }
        self.to_act = Seat::BigBlind;
        Ok(())
    }

    fn refund_uncalled(&mut self) {
        let invested = [self.players[0].invested(), self.players[1].invested()];
        if let Some((seat, excess)) = uncalled(invested) {
            self.players[seat.index()].refund(excess);
            let street_top = self.players.iter().map(Player::committed).max().unwrap_or(0);
            self.current_bet = street_top;
        }
    }

    /// Settles a completed hand.
    ///
    /// # Errors
    ///
    /// - [`GameError::HandInProgress`] - the hand has not finished
    /// - [`GameError::ChipConservationViolation`] - stacks and pot disagree
    /// - [`GameError::EvalMismatch`] - the two showdown evaluators disagree
    pub fn outcome(&self) -> Result<HandOutcome, GameError> {
        let ending = self.ending.ok_or(GameError::HandInProgress)?;
        self.check_conservation()?;
        let (winner, showdown) = match ending {
            Ending::Fold => {
                let winner = if self.players[0].is_folded() {
                    Seat::BigBlind
                } else {
                    Seat::SmallBlind
                };
                (Some(winner), None)
            }
            Ending::Showdown => self.showdown()?,
        };
        let invested = [self.players[0].invested(), self.players[1].invested()];
        let [sb_delta, bb_delta] = settle(invested, winner);
        if sb_delta + bb_delta != 0 {
            return Err(GameError::ChipConservationViolation {
                hand_id: self.id.clone(),
                detail: format!("deltas {sb_delta} and {bb_delta} do not cancel"),
            });
        }
        Ok(HandOutcome {
            winner,
            pot: self.pot(),
            sb_delta,
            bb_delta,
            ending,
            showdown,
        })
    }

    fn seven(&self, seat: Seat) -> Vec<Card> {
        let mut cards = self.players[seat.index()].hole_cards().to_vec();
        cards.extend_from_slice(&self.board);
        cards
    }

    fn showdown(&self) -> Result<(Option<Seat>, Option<ShowdownInfo>), GameError> {
        let sb = evaluate_hand(&self.seven(Seat::SmallBlind));
        let bb = evaluate_hand(&self.seven(Seat::BigBlind));
        let declared = winner_of(sb.cmp(&bb));
        let recomputed = winner_of(
            raw_score(&self.seven(Seat::SmallBlind)).cmp(&raw_score(&self.seven(Seat::BigBlind))),
        );
        if declared != recomputed {
            tracing::error!(hand_id = %self.id, ?declared, ?recomputed, "showdown evaluators disagree");
            return Err(GameError::EvalMismatch {
                hand_id: self.id.clone(),
                declared,
                recomputed,
            });
        }
        let info = ShowdownInfo {
            winners: match declared {
                Some(seat) => vec![seat],
                None => vec![Seat::SmallBlind, Seat::BigBlind],
            },
            notes: Some(showdown_note(&sb, &bb)),
        };
        Ok((declared, Some(info)))
    }

    fn check_conservation(&self) -> Result<(), GameError> {
        for p in &self.players {
            if p.stack() + p.invested() != self.config.starting_stack {
                return Err(GameError::ChipConservationViolation {
                    hand_id: self.id.clone(),
                    detail: format!(
                        "{} holds {} behind with {} invested, started with {}",
                        p.seat(),
                        p.stack(),
                        p.invested(),
                        self.config.starting_stack
                    ),
                });
            }
        }
        Ok(())
    }

    /// History record of the hand so far.
    pub fn hand_record(&self, outcome: Option<&HandOutcome>) -> HandRecord {
        HandRecord {
            hand_id: self.id.clone(),
            seed: self.seed,
            seats: Vec::new(),
            holes: [self.players[0].hole_cards(), self.players[1].hole_cards()],
            actions: self.history.clone(),
            board: self.board.clone(),
            result: outcome.map(|o| match o.winner {
                Some(seat) => format!("{seat} wins {}", o.pot),
                None => format!("split {}", o.pot),
            }),
            ts: None,
            meta: None,
            showdown: outcome.and_then(|o| o.showdown.clone()),
        }
    }
}

fn winner_of(ord: Ordering) -> Option<Seat> {
    match ord {
        Ordering::Greater => Some(Seat::SmallBlind),
        Ordering::Less => Some(Seat::BigBlind),
        Ordering::Equal => None,
    }
}

fn showdown_note(sb: &HandStrength, bb: &HandStrength) -> String {
    match sb.cmp(bb) {
        Ordering::Equal => format!("split pot ({})", sb.category),
        Ordering::Greater => format!("{} over {}", sb.category, bb.category),
        Ordering::Less => format!("{} over {}", bb.category, sb.category),
    }
}
