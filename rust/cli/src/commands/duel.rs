//! `duel`: one match between two built-in agents.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use duelbench_ai::AGENT_KINDS;
use duelbench_arena::{ArenaConfig, Contestant, MatchEnd, StopHandle, run_match};
use duelbench_engine::logger::HandLogger;

use super::{armed_token, open_store, runtime, watch_ctrl_c};
use crate::config;
use crate::error::CliError;

#[derive(Debug, Clone, Default)]
pub struct DuelArgs {
    pub a: String,
    pub b: String,
    pub pairs: Option<u32>,
    pub seed: Option<u64>,
    pub history: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub immediate: bool,
    pub max_seconds: Option<u64>,
    pub probe: Option<f64>,
    pub json: bool,
}

/// A built-in agent by kind; unknown kinds list the known ones.
pub(crate) fn contestant(kind: &str, seed: u64) -> Result<Contestant, CliError> {
    Contestant::builtin(kind, seed).map_err(|_| {
        CliError::InvalidInput(format!(
            "unknown agent '{}', expected one of: {}",
            kind,
            AGENT_KINDS.join(", ")
        ))
    })
}

/// Equal names get a `#n` suffix so every contestant is told apart.
pub(crate) fn unique_names(contestants: &mut [Contestant]) {
    for i in 1..contestants.len() {
        let name = contestants[i].name.clone();
        let suffixed = format!("{name}#");
        let taken = contestants[..i]
            .iter()
            .filter(|c| c.name == name || c.name.starts_with(&suffixed))
            .count();
        if taken > 0 {
            contestants[i].name = format!("{name}#{}", taken + 1);
        }
    }
}

fn apply_flags(config: &mut ArenaConfig, args: &DuelArgs) -> Result<(), CliError> {
    if let Some(pairs) = args.pairs {
        config.pairs = pairs;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.immediate {
        config.stop.immediate = true;
    }
    if args.max_seconds.is_some() {
        config.stop.max_seconds = args.max_seconds;
    }
    if args.probe.is_some() {
        config.probe_probability = args.probe;
    }
    config.validate()?;
    Ok(())
}

pub fn handle_duel_command(
    args: &DuelArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let mut config = config::load_with_sources()?.config;
    apply_flags(&mut config, args)?;

    let agent_seed = config.seed.unwrap_or_else(rand::random);
    let mut pair = vec![
        contestant(&args.a, agent_seed)?,
        contestant(&args.b, agent_seed.wrapping_add(1))?,
    ];
    unique_names(&mut pair);

    let mut history = match &args.history {
        Some(path) => Some(HandLogger::create(path)?),
        None => None,
    };
    let mut store = open_store(args.db.as_deref(), err)?;

    let rt = runtime()?;
    let (report, interrupted) = rt.block_on(async {
        let handle = StopHandle::new();
        let token = armed_token(&handle, &config);
        let (interrupted, watcher) = watch_ctrl_c(&handle, config.stop.mode());
        let result = run_match(
            &config,
            &pair[0],
            &pair[1],
            store.as_mut(),
            token,
            history.as_mut(),
        )
        .await;
        watcher.abort();
        result.map(|report| (report, interrupted.load(Ordering::SeqCst)))
    })?;

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(out, "{}", report.summary(config.big_blind))?;
    }
    if let Some(path) = &args.history {
        writeln!(err, "hand history written to {}", path.display())?;
    }

    if let MatchEnd::EngineFault { detail } = &report.end {
        return Err(CliError::Arena(detail.clone()));
    }
    if interrupted {
        return Err(CliError::Interrupted(format!("match ended as {}", report.end)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_agent_lists_the_known_kinds() {
        let e = contestant("oracle", 1).unwrap_err();
        let msg = e.to_string();
        assert!(msg.contains("oracle"));
        assert!(msg.contains("baseline, random, station"));
    }

    #[test]
    fn equal_agents_get_distinct_names() {
        let mut cs = vec![
            contestant("baseline", 1).unwrap(),
            contestant("baseline", 2).unwrap(),
            contestant("baseline", 3).unwrap(),
        ];
        unique_names(&mut cs);
        assert_eq!(cs[0].name, "BaselineAgent");
        assert_eq!(cs[1].name, "BaselineAgent#2");
        assert_eq!(cs[2].name, "BaselineAgent#3");
    }

    #[test]
    fn flags_override_and_are_validated() {
        let mut config = ArenaConfig::default();
        let args = DuelArgs {
            pairs: Some(3),
            seed: Some(9),
            immediate: true,
            ..DuelArgs::default()
        };
        apply_flags(&mut config, &args).unwrap();
        assert_eq!(config.pairs, 3);
        assert_eq!(config.seed, Some(9));
        assert!(config.stop.immediate);

        let bad = DuelArgs {
            pairs: Some(0),
            ..DuelArgs::default()
        };
        assert!(matches!(
            apply_flags(&mut config, &bad),
            Err(CliError::InvalidInput(_))
        ));
    }
}
