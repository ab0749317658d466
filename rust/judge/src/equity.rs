use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use duelbench_engine::cards::{full_deck, Card};
use duelbench_engine::hand::evaluate_hand;

use crate::JudgeError;

/// Showdown tally of the hero against every possible opponent holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equity {
    pub wins: u32,
    pub ties: u32,
    pub combos: u32,
}

impl Equity {
    /// Win = 1, tie = 0.5, averaged over all combos.
    pub fn value(&self) -> f64 {
        if self.combos == 0 {
            return 0.0;
        }
        (f64::from(self.wins) + 0.5 * f64::from(self.ties)) / f64::from(self.combos)
    }
}

/// Exact river equity of `hero` on `board` against all two-card combinations
/// of the unseen cards.
pub fn river_equity(hero: [Card; 2], board: &[Card]) -> Result<Equity, JudgeError> {
    if board.len() != 5 {
        return Err(JudgeError::IncompleteBoard(board.len()));
    }
    let mut seen = HashSet::with_capacity(7);
    for c in hero.iter().chain(board) {
        if !seen.insert(*c) {
            return Err(JudgeError::DuplicateCard(c.to_string()));
        }
    }

    let mut cards = hero.to_vec();
    cards.extend_from_slice(board);
    let hero_strength = evaluate_hand(&cards);

    let unseen: Vec<Card> = full_deck().into_iter().filter(|c| !seen.contains(c)).collect();
    let mut villain = board.to_vec();
    villain.extend([hero[0], hero[1]]);

    let mut eq = Equity {
        wins: 0,
        ties: 0,
        combos: 0,
    };
    for (i, &x) in unseen.iter().enumerate() {
        for &y in &unseen[i + 1..] {
            villain[5] = x;
            villain[6] = y;
            eq.combos += 1;
            match hero_strength.cmp(&evaluate_hand(&villain)) {
                Ordering::Greater => eq.wins += 1,
                Ordering::Equal => eq.ties += 1,
                Ordering::Less => {}
            }
        }
    }
    Ok(eq)
}
