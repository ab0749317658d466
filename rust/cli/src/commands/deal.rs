//! `deal`: deals one hand for a seed and checks it down, showing what a
//! mirrored pair would be played with.

use crate::error::CliError;
use duelbench_engine::cards::format_cards;
use duelbench_engine::{ActionKind, Engine, GameConfig, PlayerAction, Seat};
use std::io::Write;

pub fn handle_deal_command(seed: Option<u64>, out: &mut dyn Write) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(rand::random);
    let mut eng = Engine::from_seed(format!("deal-{seed}"), GameConfig::default(), seed)
        .map_err(|e| CliError::Arena(e.to_string()))?;

    writeln!(out, "Seed: {}", seed)?;
    writeln!(out, "Hole SB: {}", format_cards(&eng.player(Seat::SmallBlind).hole_cards()))?;
    writeln!(out, "Hole BB: {}", format_cards(&eng.player(Seat::BigBlind).hole_cards()))?;

    while eng.to_act().is_some() {
        let action = if eng.legal_actions().contains(&ActionKind::Check) {
            PlayerAction::Check
        } else {
            PlayerAction::Call
        };
        eng.apply(action).map_err(|e| CliError::Arena(e.to_string()))?;
    }
    writeln!(out, "Board: {}", format_cards(eng.board()))?;

    let outcome = eng.outcome().map_err(|e| CliError::Arena(e.to_string()))?;
    match outcome.winner {
        Some(seat) => writeln!(out, "Winner: {} ({} chips)", seat, outcome.pot)?,
        None => writeln!(out, "Split pot ({} chips)", outcome.pot)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_deals_the_same_hand() {
        let mut out1 = Vec::new();
        let mut out2 = Vec::new();
        handle_deal_command(Some(12345), &mut out1).unwrap();
        handle_deal_command(Some(12345), &mut out2).unwrap();
        assert_eq!(out1, out2);
    }

    #[test]
    fn output_lists_holes_board_and_result() {
        let mut out = Vec::new();
        handle_deal_command(Some(999), &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Seed: 999");
        assert!(lines[1].starts_with("Hole SB: "));
        assert!(lines[2].starts_with("Hole BB: "));
        assert!(lines[3].starts_with("Board: "));
        assert_eq!(lines[3].split_whitespace().count(), 6);
        assert!(lines[4].contains("200 chips"));
    }
}
