use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::HighCard => "high card",
            Category::OnePair => "one pair",
            Category::TwoPair => "two pair",
            Category::ThreeOfAKind => "three of a kind",
            Category::Straight => "straight",
            Category::Flush => "flush",
            Category::FullHouse => "full house",
            Category::FourOfAKind => "four of a kind",
            Category::StraightFlush => "straight flush",
        };
        f.write_str(s)
    }
}

/// Strength of the best five-card hand. The derived order is the showdown
/// order: category first, then kickers high to low.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    // kickers: ordered high -> low for tiebreaks
    pub kickers: [u8; 5],
}

/// Evaluates the best five-card hand contained in `cards` (normally 5 to 7
/// cards: two hole cards plus the board).
pub fn evaluate_hand(cards: &[Card]) -> HandStrength {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut rank_mask: u16 = 0;
    let mut suit_masks = [0u16; 4];
    for &c in cards {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        rank_mask |= 1 << r;
        suit_masks[suit_index(c.suit)] |= 1 << r;
    }

    let flush_mask = suit_masks
        .iter()
        .copied()
        .find(|m| m.count_ones() >= 5);

    if let Some(high) = flush_mask.and_then(straight_high_from_mask) {
        return HandStrength {
            category: Category::StraightFlush,
            kickers: [high, 0, 0, 0, 0],
        };
    }

    let (quads, trips, pairs, singles) = group_ranks(&rank_counts);

    if let Some(&quad) = quads.first() {
        let kicker = highest_excluding(&rank_counts, &[quad]);
        return HandStrength {
            category: Category::FourOfAKind,
            kickers: [quad, kicker, 0, 0, 0],
        };
    }

    if let Some(&trip) = trips.first() {
        // a second set of trips plays as the pair
        let pair = trips
            .get(1)
            .copied()
            .into_iter()
            .chain(pairs.first().copied())
            .max();
        if let Some(pair) = pair {
            return HandStrength {
                category: Category::FullHouse,
                kickers: [trip, pair, 0, 0, 0],
            };
        }
    }

    if let Some(mask) = flush_mask {
        return HandStrength {
            category: Category::Flush,
            kickers: top_ranks_of_mask(mask),
        };
    }

    if let Some(high) = straight_high_from_mask(rank_mask) {
        return HandStrength {
            category: Category::Straight,
            kickers: [high, 0, 0, 0, 0],
        };
    }

    if let Some(&trip) = trips.first() {
        let mut rest = descending_excluding(&rank_counts, &[trip]);
        rest.resize(2, 0);
        return HandStrength {
            category: Category::ThreeOfAKind,
            kickers: [trip, rest[0], rest[1], 0, 0],
        };
    }

    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        // a third pair can still supply the kicker
        let kicker = highest_excluding(&rank_counts, &[high, low]);
        return HandStrength {
            category: Category::TwoPair,
            kickers: [high, low, kicker, 0, 0],
        };
    }

    if let Some(&pair) = pairs.first() {
        let mut rest = descending_excluding(&rank_counts, &[pair]);
        rest.resize(3, 0);
        return HandStrength {
            category: Category::OnePair,
            kickers: [pair, rest[0], rest[1], rest[2], 0],
        };
    }

    let mut k = [0u8; 5];
    for (slot, r) in k.iter_mut().zip(singles) {
        *slot = r;
    }
    HandStrength {
        category: Category::HighCard,
        kickers: k,
    }
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

/// Packed score of the best five-card subset, computed by brute force over
/// every combination. Independent of [`evaluate_hand`]; used to cross-check
/// showdown winners.
pub fn raw_score(cards: &[Card]) -> u32 {
    let n = cards.len();
    if n < 5 {
        return score_five(cards);
    }
    let mut best = 0;
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        best = best.max(score_five(&five));
                    }
                }
            }
        }
    }
    best
}

fn score_five(cards: &[Card]) -> u32 {
    let mut counts = [0u8; 15];
    for c in cards {
        counts[c.rank.value() as usize] += 1;
    }
    // (count, rank) groups, biggest group first then highest rank
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|&r| counts[r as usize] > 0)
        .map(|r| (counts[r as usize], r))
        .collect();
    groups.sort_by(|x, y| y.cmp(x));

    let flush = cards.len() == 5 && cards.iter().all(|c| c.suit == cards[0].suit);
    let distinct: Vec<u8> = groups.iter().map(|g| g.1).collect();
    let straight_high = if distinct.len() == 5 {
        if distinct[0] - distinct[4] == 4 {
            Some(distinct[0])
        } else if distinct == [14, 5, 4, 3, 2] {
            Some(5)
        } else {
            None
        }
    } else {
        None
    };

    let (category, ranks): (u32, Vec<u8>) = match (straight_high, flush, groups[0].0) {
        (Some(h), true, _) => (8, vec![h]),
        (_, _, 4) => (7, distinct),
        (_, _, 3) if groups.len() == 2 => (6, distinct),
        (None, true, _) => (5, distinct),
        (Some(h), false, _) => (4, vec![h]),
        (_, _, 3) => (3, distinct),
        (_, _, 2) if groups.len() == 3 => (2, distinct),
        (_, _, 2) => (1, distinct),
        _ => (0, distinct),
    };
    let mut score = category << 20;
    for (i, r) in ranks.iter().take(5).enumerate() {
        score |= u32::from(*r) << (16 - 4 * i);
    }
    score
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    // Treat Ace as 14 and optionally as 1
    let mut m = mask;
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    // Sliding 5-bit window from Ace(14) down to 5
    for high in (5..=14u16).rev() {
        let window = 0b11111u16 << (high - 4);
        if (m & window) == window {
            return Some(high as u8);
        }
    }
    None
}

fn top_ranks_of_mask(mask: u16) -> [u8; 5] {
    let mut k = [0u8; 5];
    let ranks = (2..=14u8).rev().filter(|r| mask & (1 << r) != 0);
    for (slot, r) in k.iter_mut().zip(ranks) {
        *slot = r;
    }
    k
}

type Groups = (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>);

// Ranks grouped by multiplicity, each list high -> low.
fn group_ranks(rank_counts: &[u8; 15]) -> Groups {
    let (mut quads, mut trips, mut pairs, mut singles) = (vec![], vec![], vec![], vec![]);
    for r in (2..=14u8).rev() {
        match rank_counts[r as usize] {
            0 => {}
            1 => singles.push(r),
            2 => pairs.push(r),
            3 => trips.push(r),
            _ => quads.push(r),
        }
    }
    (quads, trips, pairs, singles)
}

fn descending_excluding(rank_counts: &[u8; 15], used: &[u8]) -> Vec<u8> {
    (2..=14u8)
        .rev()
        .filter(|r| rank_counts[*r as usize] > 0 && !used.contains(r))
        .collect()
}

fn highest_excluding(rank_counts: &[u8; 15], used: &[u8]) -> u8 {
    descending_excluding(rank_counts, used)
        .first()
        .copied()
        .unwrap_or(0)
}
