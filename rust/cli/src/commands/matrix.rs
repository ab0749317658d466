//! `matrix`: round robin between several built-in agents.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use duelbench_arena::{MatrixReport, StopHandle, run_matrix};

use super::duel::{contestant, unique_names};
use super::{armed_token, open_store, runtime, watch_ctrl_c};
use crate::config;
use crate::error::CliError;

#[derive(Debug, Clone, Default)]
pub struct MatrixArgs {
    pub agents: Vec<String>,
    pub pairs: Option<u32>,
    pub seed: Option<u64>,
    pub db: Option<PathBuf>,
    pub json: bool,
}

pub fn handle_matrix_command(
    args: &MatrixArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if args.agents.len() < 2 {
        return Err(CliError::InvalidInput(
            "matrix needs at least two agents".into(),
        ));
    }
    let mut config = config::load_with_sources()?.config;
    if let Some(pairs) = args.pairs {
        config.pairs = pairs;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let agent_seed = config.seed.unwrap_or_else(rand::random);
    let mut contestants = args
        .agents
        .iter()
        .enumerate()
        .map(|(i, kind)| contestant(kind, agent_seed.wrapping_add(i as u64)))
        .collect::<Result<Vec<_>, _>>()?;
    unique_names(&mut contestants);
    let mut store = open_store(args.db.as_deref(), err)?;

    let rt = runtime()?;
    let (report, interrupted) = rt.block_on(async {
        let handle = StopHandle::new();
        let token = armed_token(&handle, &config);
        let (interrupted, watcher) = watch_ctrl_c(&handle, config.stop.mode());
        let result = run_matrix(&config, &contestants, store.as_mut(), token).await;
        watcher.abort();
        result.map(|report| (report, interrupted.load(Ordering::SeqCst)))
    })?;

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_table(&report, config.big_blind, out)?;
    }

    if interrupted {
        return Err(CliError::Interrupted(format!(
            "{} of the scheduled matches played",
            report.matches.len()
        )));
    }
    Ok(())
}

fn write_table(report: &MatrixReport, big_blind: u32, out: &mut dyn Write) -> Result<(), CliError> {
    for m in &report.matches {
        writeln!(out, "{}", m.summary(big_blind))?;
    }
    writeln!(out, "standings:")?;
    for (rank, s) in report.standings.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<16} glicko {:>7.1} (rd {:>5.1})  matches {:>2}  net {:>+8}",
            rank + 1,
            s.name,
            s.glicko.rating,
            s.glicko.rd,
            s.matches,
            s.net_chips
        )?;
    }
    if report.interrupted {
        writeln!(out, "round robin incomplete")?;
    }
    Ok(())
}
