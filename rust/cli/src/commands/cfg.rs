//! `cfg`: prints the resolved configuration as JSON, each tracked value
//! with the place it came from (`default`, `file` or `env`).

use crate::config;
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = config::load_with_sources()?;

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "starting_stack": {
            "value": config.starting_stack,
            "source": sources.starting_stack,
        },
        "pairs": {
            "value": config.pairs,
            "source": sources.pairs,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "decision_timeout_ms": {
            "value": config.decision_timeout_ms,
            "source": sources.decision_timeout_ms,
        },
        "stop_immediate": {
            "value": config.stop.immediate,
            "source": sources.immediate,
        },
        "max_seconds": {
            "value": config.stop.max_seconds,
            "source": sources.max_seconds,
        },
        "stop_file": {
            "value": config.stop.stop_file,
            "source": sources.stop_file,
        },
        "blinds": [config.small_blind, config.big_blind],
        "probe_probability": config.probe_probability,
    });
    let json_str = serde_json::to_string_pretty(&display)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
