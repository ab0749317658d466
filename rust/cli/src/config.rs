use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use duelbench_arena::ArenaConfig;

pub const CONFIG_ENV: &str = "DUELBENCH_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub starting_stack: ValueSource,
    pub pairs: ValueSource,
    pub seed: ValueSource,
    pub decision_timeout_ms: ValueSource,
    pub immediate: ValueSource,
    pub max_seconds: ValueSource,
    pub stop_file: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            starting_stack: ValueSource::Default,
            pairs: ValueSource::Default,
            seed: ValueSource::Default,
            decision_timeout_ms: ValueSource::Default,
            immediate: ValueSource::Default,
            max_seconds: ValueSource::Default,
            stop_file: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: ArenaConfig,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

/// Defaults, then the TOML file named by `DUELBENCH_CONFIG`, then
/// `DUELBENCH_*` variables. Command line flags are applied by the caller.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = ArenaConfig::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&s)?;
        cfg = toml::from_str(&s)?;

        let stop = table.get("stop").and_then(toml::Value::as_table);
        let in_file = |key: &str| table.contains_key(key);
        let in_stop = |key: &str| stop.is_some_and(|t| t.contains_key(key));
        let mark = |present: bool, source: &mut ValueSource| {
            if present {
                *source = ValueSource::File;
            }
        };
        mark(in_file("starting_stack"), &mut sources.starting_stack);
        mark(in_file("pairs"), &mut sources.pairs);
        mark(in_file("seed"), &mut sources.seed);
        mark(in_file("decision_timeout_ms"), &mut sources.decision_timeout_ms);
        mark(in_stop("immediate"), &mut sources.immediate);
        mark(in_stop("max_seconds"), &mut sources.max_seconds);
        mark(in_stop("stop_file"), &mut sources.stop_file);
    }

    if let Some(seed) = env_value("DUELBENCH_SEED") {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid DUELBENCH_SEED: {seed}")))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(pairs) = env_value("DUELBENCH_PAIRS") {
        cfg.pairs = pairs
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid DUELBENCH_PAIRS: {pairs}")))?;
        sources.pairs = ValueSource::Env;
    }
    if let Some(flag) = env_value("DUELBENCH_STOP_IMMEDIATE") {
        cfg.stop.immediate = parse_bool(&flag).ok_or_else(|| {
            ConfigError::Invalid(format!("Invalid DUELBENCH_STOP_IMMEDIATE: {flag}"))
        })?;
        sources.immediate = ValueSource::Env;
    }
    if let Some(secs) = env_value("DUELBENCH_MAX_SECONDS") {
        cfg.stop.max_seconds = Some(secs.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid DUELBENCH_MAX_SECONDS: {secs}"))
        })?);
        sources.max_seconds = ValueSource::Env;
    }
    if let Some(path) = env_value("DUELBENCH_STOP_FILE") {
        cfg.stop.stop_file = Some(PathBuf::from(path));
        sources.stop_file = ValueSource::Env;
    }

    cfg.validate()
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn file_config_fills_nested_stop_section() {
        let cfg: ArenaConfig =
            toml::from_str("pairs = 3\n[stop]\nimmediate = true\nmax_seconds = 60\n").unwrap();
        assert_eq!(cfg.pairs, 3);
        assert!(cfg.stop.immediate);
        assert_eq!(cfg.stop.max_seconds, Some(60));
        assert_eq!(cfg.big_blind, ArenaConfig::default().big_blind);
    }
}
