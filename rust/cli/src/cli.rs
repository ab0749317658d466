//! Command line definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "duelbench",
    author,
    version,
    about = "Heads-up no-limit duels between agents, rated with Elo and Glicko-2"
)]
pub struct DuelbenchCli {
    /// Log as JSON lines instead of text
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play one match of mirrored pairs between two agents
    Duel {
        /// Agent in seat A: baseline, random or station
        #[arg(long, default_value = "baseline")]
        a: String,
        /// Agent in seat B
        #[arg(long, default_value = "station")]
        b: String,
        #[arg(long)]
        pairs: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        /// Write every hand as a JSON line to this file
        #[arg(long)]
        history: Option<PathBuf>,
        /// SQLite database for action logs, ratings and careers
        #[arg(long)]
        db: Option<PathBuf>,
        /// Stop requests cancel the decision in flight
        #[arg(long)]
        immediate: bool,
        #[arg(long)]
        max_seconds: Option<u64>,
        /// Exploration probability in unbet spots
        #[arg(long)]
        probe: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Round robin between several agents
    Matrix {
        /// Agent kinds, at least two
        #[arg(long = "agent", required = true, num_args = 1..)]
        agents: Vec<String>,
        #[arg(long)]
        pairs: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Deal a single hand and check it down
    Deal {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}
