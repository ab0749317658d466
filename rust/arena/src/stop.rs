//! Cooperative stop control for a running match.
//!
//! A [`StopHandle`] is held by whoever may end the match (a signal handler, a
//! test); the match polls its [`StopToken`] before every decision, between
//! hands and between pairs. A graceful stop lets the in-flight pair finish.
//! An immediate stop also cancels a decision that is already waiting on an
//! agent.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;

const STOP_FILE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopMode {
    #[default]
    Graceful,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Running,
    Stop(StopMode),
}

#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<Signal>>,
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Signal::Running);
        Self { tx: Arc::new(tx) }
    }

    pub fn token(&self) -> StopToken {
        StopToken {
            rx: self.tx.subscribe(),
            deadline: None,
            stop_file: None,
            mode: StopMode::Graceful,
        }
    }

    /// Requests a stop. An immediate request upgrades an earlier graceful
    /// one; a graceful request never downgrades an immediate one.
    pub fn request(&self, mode: StopMode) {
        self.tx.send_if_modified(|signal| {
            let next = match (*signal, mode) {
                (Signal::Stop(StopMode::Immediate), _) => return false,
                (_, mode) => Signal::Stop(mode),
            };
            if *signal == next {
                return false;
            }
            *signal = next;
            true
        });
        tracing::info!(?mode, "stop requested");
    }

    pub fn requested(&self) -> Option<StopMode> {
        match *self.tx.borrow() {
            Signal::Running => None,
            Signal::Stop(mode) => Some(mode),
        }
    }
}

/// Receiving side of a [`StopHandle`], optionally armed with a deadline and
/// a stop file that trigger in the token's own mode.
#[derive(Debug, Clone)]
pub struct StopToken {
    rx: watch::Receiver<Signal>,
    deadline: Option<Instant>,
    stop_file: Option<PathBuf>,
    mode: StopMode,
}

impl StopToken {
    /// Mode used when the deadline or the stop file fires.
    pub fn with_mode(mut self, mode: StopMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_deadline(mut self, after: Duration) -> Self {
        self.deadline = Some(Instant::now() + after);
        self
    }

    pub fn with_stop_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stop_file = Some(path.into());
        self
    }

    /// Checkpoint: the stop in effect right now, if any.
    pub fn poll(&self) -> Option<StopMode> {
        if let Signal::Stop(mode) = *self.rx.borrow() {
            return Some(mode);
        }
        if self.deadline.is_some_and(|at| Instant::now() >= at) {
            return Some(self.mode);
        }
        if self.stop_file.as_ref().is_some_and(|p| p.exists()) {
            return Some(self.mode);
        }
        None
    }

    pub fn is_immediate(&self) -> bool {
        self.poll() == Some(StopMode::Immediate)
    }

    /// Resolves once an immediate stop is in effect. Never resolves for a
    /// token that can only stop gracefully.
    pub async fn immediate(&self) {
        let mut rx = self.rx.clone();
        let mut handle_alive = true;
        let own_triggers = self.mode == StopMode::Immediate;
        loop {
            if self.is_immediate() {
                return;
            }
            let deadline = self.deadline.filter(|_| own_triggers);
            let watch_file = own_triggers && self.stop_file.is_some();
            tokio::select! {
                changed = rx.changed(), if handle_alive => {
                    if changed.is_err() {
                        handle_alive = false;
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {}
                _ = tokio::time::sleep(STOP_FILE_POLL), if watch_file => {}
                else => std::future::pending::<()>().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graceful_does_not_downgrade_immediate() {
        let handle = StopHandle::new();
        let token = handle.token();
        assert_eq!(token.poll(), None);
        handle.request(StopMode::Graceful);
        assert_eq!(token.poll(), Some(StopMode::Graceful));
        handle.request(StopMode::Immediate);
        handle.request(StopMode::Graceful);
        assert_eq!(token.poll(), Some(StopMode::Immediate));
        assert_eq!(handle.requested(), Some(StopMode::Immediate));
    }

    #[test]
    fn stop_file_triggers_in_token_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("STOP");
        let token = StopHandle::new()
            .token()
            .with_stop_file(&path)
            .with_mode(StopMode::Immediate);
        assert_eq!(token.poll(), None);
        std::fs::write(&path, b"").unwrap();
        assert!(token.is_immediate());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_future_resolves_on_request_and_deadline() {
        let handle = StopHandle::new();
        let token = handle.token();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.immediate().await })
        };
        handle.request(StopMode::Immediate);
        waiter.await.unwrap();

        let timed = StopHandle::new()
            .token()
            .with_mode(StopMode::Immediate)
            .with_deadline(Duration::from_secs(5));
        tokio::time::timeout(Duration::from_secs(6), timed.immediate())
            .await
            .expect("deadline should fire first");
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_deadline_never_cancels_a_decision() {
        let token = StopHandle::new().token().with_deadline(Duration::from_secs(1));
        let res = tokio::time::timeout(Duration::from_secs(3), token.immediate()).await;
        assert!(res.is_err());
        assert_eq!(token.poll(), Some(StopMode::Graceful));
    }
}
