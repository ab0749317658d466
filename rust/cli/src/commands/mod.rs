//! Subcommand handlers.
//!
//! Each handler takes its parsed arguments plus the output streams and
//! returns `Result<(), CliError>`; [`crate::run`] turns the result into an
//! exit code.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use duelbench_arena::{
    ArenaConfig, MatchStore, MemoryStore, SqliteStore, StopHandle, StopMode, StopToken,
};

use crate::error::CliError;
use crate::ui;

pub mod cfg;
pub mod deal;
pub mod duel;
pub mod matrix;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use duel::{DuelArgs, handle_duel_command};
pub use matrix::{MatrixArgs, handle_matrix_command};

/// Single-threaded runtime for one command.
fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Token armed with the configured deadline and stop file.
fn armed_token(handle: &StopHandle, config: &ArenaConfig) -> StopToken {
    let mut token = handle.token().with_mode(config.stop.mode());
    if let Some(secs) = config.stop.max_seconds {
        token = token.with_deadline(Duration::from_secs(secs));
    }
    if let Some(path) = &config.stop.stop_file {
        token = token.with_stop_file(path.clone());
    }
    token
}

/// Ctrl+C requests a stop in the configured mode; a second Ctrl+C makes it
/// immediate. Must be called inside the runtime. The returned flag records
/// whether the user interrupted.
fn watch_ctrl_c(handle: &StopHandle, mode: StopMode) -> (Arc<AtomicBool>, tokio::task::JoinHandle<()>) {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    let handle = handle.clone();
    let task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        flag.store(true, Ordering::SeqCst);
        handle.request(mode);
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.request(StopMode::Immediate);
        }
    });
    (interrupted, task)
}

/// SQLite store at `path`, or an in-memory store. A database that cannot be
/// opened is reported and replaced by memory so the match still runs.
fn open_store(path: Option<&Path>, err: &mut dyn std::io::Write) -> Result<Box<dyn MatchStore>, CliError> {
    let Some(path) = path else {
        return Ok(Box::new(MemoryStore::default()));
    };
    match SqliteStore::open(path) {
        Ok(store) => Ok(Box::new(store)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "database unavailable, using memory store");
            ui::display_warning(err, &format!("{}; results will not be saved", e))?;
            Ok(Box::new(MemoryStore::default()))
        }
    }
}
