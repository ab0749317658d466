//! # duelbench-engine: Heads-Up Hand Engine
//!
//! Deterministic heads-up no-limit hold'em for benchmark duels. Provides the
//! seeded deck, best-five-card ranking, the per-hand betting state machine and
//! the record types written to the decision log.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card), text form and deck construction
//! - [`deck`] - Seeded ChaCha20 deck shuffling and the splitmix64 seed stream
//! - [`engine`] - Betting state machine for one hand
//! - [`game`] - Table configuration and settled hand outcomes
//! - [`hand`] - Hand evaluation and strength comparison
//! - [`observation`] - Read-only view handed to a decision-maker
//! - [`player`] - Seats, actions and per-player chip state
//! - [`pot`] - Settlement and uncalled-chip accounting
//! - [`rules`] - Legal action sets and action validation
//! - [`logger`] - Hand records, decision-log rows and JSONL hand history
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use duelbench_engine::cards::parse_cards;
//! use duelbench_engine::hand::{evaluate_hand, Category};
//!
//! let cards = parse_cards("Ah Kh Qh Jh Th 2c 3d").unwrap();
//! let strength = evaluate_hand(&cards);
//! assert_eq!(strength.category, Category::StraightFlush);
//! ```
//!
//! ## Playing a Hand
//!
//! Hands built from the same seed deal the same cards, which is what makes
//! mirrored pairs fair:
//!
//! ```rust
//! use duelbench_engine::engine::{Engine, Transition};
//! use duelbench_engine::game::GameConfig;
//! use duelbench_engine::player::{PlayerAction, Seat};
//!
//! let mut hand = Engine::from_seed("demo-1A", GameConfig::default(), 42).unwrap();
//! assert_eq!(hand.to_act(), Some(Seat::SmallBlind));
//!
//! let t = hand.apply(PlayerAction::Fold).unwrap();
//! assert_eq!(t, Transition::Complete);
//!
//! let outcome = hand.outcome().unwrap();
//! assert_eq!(outcome.bb_delta, 50);
//! assert_eq!(outcome.sb_delta, -50);
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod hand;
pub mod logger;
pub mod observation;
pub mod player;
pub mod pot;
pub mod rules;

pub use engine::{Engine, Transition};
pub use errors::GameError;
pub use game::{GameConfig, HandOutcome};
pub use observation::Observation;
pub use player::{PlayerAction, Seat};
pub use rules::ActionKind;
