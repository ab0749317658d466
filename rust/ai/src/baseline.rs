//! Baseline agent for duels.
//!
//! A rule-based reference opponent: hand strength on a 0-10 scale, pot odds
//! for calls, and deterministic bet sizing. Useful as a yardstick and for
//! exercising the orchestrator without a remote decision-maker.

use async_trait::async_trait;

use crate::{Agent, AgentError, Decision};
use duelbench_engine::cards::Card;
use duelbench_engine::hand::{Category, evaluate_hand};
use duelbench_engine::logger::Street;
use duelbench_engine::observation::Observation;
use duelbench_engine::player::PlayerAction;
use duelbench_engine::rules::ActionKind;

/// Simple baseline agent for testing and comparison.
///
/// # Strategy
///
/// **Preflop:**
/// - Strong hands (high pairs 77+, AK, AQ): Raise or call
/// - Medium hands (suited connectors, Ax, small pairs): Call if cheap
/// - Weak hands: Fold to raises, check if free
///
/// **Postflop:**
/// - Strong hands (Two Pair+): Bet or call
/// - Medium hands (One Pair): Check or call small bets
/// - Weak hands: Fold unless the price is tiny
#[derive(Debug, Clone, Default)]
pub struct BaselineAgent;

impl BaselineAgent {
    pub fn new() -> Self {
        Self
    }

    /// Preflop hand strength on a scale of 0-10.
    ///
    /// - 9-10: Premium hands (AA, KK, QQ, JJ, AKs)
    /// - 7-8: Strong hands (TT-99, AK, AQ, KQs)
    /// - 5-6: Medium hands (88-77, AJ, suited connectors)
    /// - 3-4: Marginal hands (66-22, Ax, broadway)
    /// - 0-2: Weak hands (offsuit low cards)
    pub(crate) fn preflop_strength(hole_cards: [Card; 2]) -> u8 {
        let r1 = hole_cards[0].rank.value();
        let r2 = hole_cards[1].rank.value();
        let (high, low) = if r1 > r2 { (r1, r2) } else { (r2, r1) };
        let suited = hole_cards[0].suit == hole_cards[1].suit;
        let bump = u8::from(suited);

        if r1 == r2 {
            return match high {
                13..=14 => 10,
                11..=12 => 9,
                10 => 8,
                9 => 7,
                8 => 6,
                7 => 5,
                _ => 4,
            };
        }

        match (high, low) {
            (14, 13) => 8 + 2 * bump,
            (14, 12) => 7 + bump,
            (14, 11) => 6 + bump,
            (14, 10) => 5 + bump,
            (14, _) => 4 + bump,
            (13, 12) => 6 + bump,
            (13, 11) => 5 + bump,
            (13, 10) => 4 + bump,
            (12, 11) => 5 + bump,
            (12, 10) => 4 + bump,
            _ => {
                if suited && high - low <= 2 {
                    if high >= 9 { 5 } else { 4 }
                } else if high >= 11 && low >= 9 {
                    4
                } else {
                    2
                }
            }
        }
    }

    /// Postflop strength from the best hand made with the board so far.
    pub(crate) fn postflop_strength(hole_cards: [Card; 2], board: &[Card]) -> Option<u8> {
        if board.len() < 3 {
            return None;
        }
        let mut cards = hole_cards.to_vec();
        cards.extend_from_slice(board);
        let strength = evaluate_hand(&cards);

        let base = match strength.category {
            Category::HighCard => 1,
            Category::OnePair => 3,
            Category::TwoPair => 5,
            Category::ThreeOfAKind => 6,
            Category::Straight => 7,
            Category::Flush => 8,
            Category::FullHouse => 9,
            Category::FourOfAKind | Category::StraightFlush => 10,
        };
        let kicker_boost = u8::from(strength.kickers[0] >= 12);
        Some((base + kicker_boost).min(10))
    }

    /// Share of the final pot the caller would be putting in.
    pub(crate) fn pot_odds(pot: u32, to_call: u32) -> f32 {
        if to_call == 0 {
            return 0.0;
        }
        to_call as f32 / (pot + to_call) as f32
    }

    fn strength(obs: &Observation) -> u8 {
        match obs.street {
            Street::Preflop => Self::preflop_strength(obs.hole_cards),
            _ => Self::postflop_strength(obs.hole_cards, &obs.board)
                .unwrap_or_else(|| Self::preflop_strength(obs.hole_cards)),
        }
    }

    // Raise-to for a sizing expressed as a share of the pot, kept in bounds.
    fn sized_raise(obs: &Observation, pot_share: f32) -> PlayerAction {
        let extra = (obs.pot as f32 * pot_share) as u32;
        let to = (obs.pot.saturating_sub(obs.to_call) / 2 + obs.to_call + extra)
            .max(obs.min_raise_to)
            .min(obs.max_raise_to);
        PlayerAction::Raise(to)
    }

    pub(crate) fn choose(obs: &Observation) -> PlayerAction {
        let strength = Self::strength(obs);
        let can_raise = obs.can(ActionKind::Raise);

        if obs.to_call == 0 {
            return match strength {
                9..=10 if can_raise => Self::sized_raise(obs, 0.66),
                7..=8 if can_raise => Self::sized_raise(obs, 0.5),
                _ => PlayerAction::Check,
            };
        }

        let odds = Self::pot_odds(obs.pot, obs.to_call);
        match strength {
            9..=10 if can_raise => Self::sized_raise(obs, 0.5),
            7..=10 => PlayerAction::Call,
            5..=6 if odds <= 0.35 => PlayerAction::Call,
            3..=4 if odds <= 0.2 => PlayerAction::Call,
            _ => PlayerAction::Fold,
        }
    }
}

#[async_trait]
impl Agent for BaselineAgent {
    async fn decide(&self, obs: &Observation) -> Result<Decision, AgentError> {
        Ok(Decision::from(Self::choose(obs)))
    }

    fn name(&self) -> &str {
        "BaselineAgent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy;
    use duelbench_engine::cards::parse_cards;
    use duelbench_engine::deck::SeedStream;
    use duelbench_engine::engine::Engine;
    use duelbench_engine::game::GameConfig;

    fn hole(s: &str) -> [Card; 2] {
        let v = parse_cards(s).unwrap();
        [v[0], v[1]]
    }

    #[test]
    fn preflop_strength_premium_pairs() {
        assert_eq!(BaselineAgent::preflop_strength(hole("Ah As")), 10);
        assert_eq!(BaselineAgent::preflop_strength(hole("Kh Ks")), 10);
    }

    #[test]
    fn preflop_strength_ace_king() {
        assert_eq!(BaselineAgent::preflop_strength(hole("Ah Kh")), 10);
        assert_eq!(BaselineAgent::preflop_strength(hole("Ah Ks")), 8);
    }

    #[test]
    fn preflop_strength_weak_and_connected() {
        assert!(BaselineAgent::preflop_strength(hole("7h 2s")) <= 3);
        assert!((4..=6).contains(&BaselineAgent::preflop_strength(hole("9h 8h"))));
    }

    #[test]
    fn pot_odds_calculation() {
        // call 50 into 100 -> 50 / 150
        assert!((BaselineAgent::pot_odds(100, 50) - 0.333).abs() < 0.01);
        assert_eq!(BaselineAgent::pot_odds(100, 0), 0.0);
    }

    #[test]
    fn postflop_strength_needs_a_flop() {
        assert_eq!(BaselineAgent::postflop_strength(hole("Ah As"), &[]), None);
        let board = parse_cards("Ad Kc Qh").unwrap();
        assert!(BaselineAgent::postflop_strength(hole("Ah As"), &board).unwrap() >= 6);
    }

    #[test]
    fn choices_are_always_legal() {
        let mut seeds = SeedStream::new(17);
        for i in 0..200 {
            let mut hand = Engine::from_seed(format!("b-{i}"), GameConfig::default(), seeds.next_seed()).unwrap();
            while !hand.is_complete() {
                let obs = hand.observation().unwrap();
                let action = BaselineAgent::choose(&obs);
                let reply = Decision::from(action);
                assert_eq!(policy::validate(&obs, &reply), Ok(action), "hand {i}: {obs:?}");
                hand.apply(action).unwrap();
            }
        }
    }
}
