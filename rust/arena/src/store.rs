//! Persistence contract for matches, and the stores behind it.
//!
//! Writes are best-effort. The orchestrator never talks to a store directly;
//! it goes through [`Recorder`], which turns the first failure into a warning
//! and carries on without a store.

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use duelbench_engine::logger::ActionLogRow;
use duelbench_judge::{Accuracy, Verdict};
use duelbench_rating::stats::ContestantStats;
use duelbench_rating::Glicko2;

use crate::report::{ActionTally, MatchEnd};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::PersistenceUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::PersistenceUnavailable(format!("encoding: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    pub match_id: String,
    /// `[A, B]`
    pub contestants: [String; 2],
    pub base_seed: u64,
    pub pairs: u32,
    pub started_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "pair", rename_all = "snake_case")]
pub enum SnapshotPhase {
    Start,
    AfterPair(u32),
    End,
}

impl SnapshotPhase {
    fn parts(self) -> (&'static str, Option<u32>) {
        match self {
            SnapshotPhase::Start => ("start", None),
            SnapshotPhase::AfterPair(i) => ("after_pair", Some(i)),
            SnapshotPhase::End => ("end", None),
        }
    }
}

/// Both rating systems at one point of a match, `[A, B]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub match_id: String,
    pub phase: SnapshotPhase,
    pub elo: [f64; 2],
    pub glicko: [Glicko2; 2],
}

/// End-of-match aggregate for one contestant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub match_id: String,
    pub name: String,
    /// `"A"` or `"B"`
    pub label: String,
    pub start_bank: u32,
    pub end_bank: i64,
    pub wins: u32,
    pub stats: ContestantStats,
    pub tally: ActionTally,
}

/// Ratings carried from one match to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Career {
    pub name: String,
    pub elo: f64,
    pub glicko: Glicko2,
    pub matches: u32,
    pub hands: u32,
}

impl Career {
    pub fn new(name: impl Into<String>, elo: f64) -> Self {
        Self {
            name: name.into(),
            elo,
            glicko: Glicko2::default(),
            matches: 0,
            hands: 0,
        }
    }
}

pub trait MatchStore: Send {
    fn begin_match(&mut self, info: &MatchInfo) -> Result<(), StoreError>;
    fn append_action(&mut self, row: &ActionLogRow) -> Result<(), StoreError>;
    fn rating_snapshot(&mut self, snapshot: &RatingSnapshot) -> Result<(), StoreError>;
    fn record_participant(&mut self, row: &ParticipantRow) -> Result<(), StoreError>;
    /// Rows of one match in `seq` order.
    fn action_rows(&self, match_id: &str) -> Result<Vec<ActionLogRow>, StoreError>;
    /// Inserts or replaces the verdict for `(match_id, seq)`.
    fn upsert_verdict(&mut self, verdict: &Verdict) -> Result<(), StoreError>;
    /// Judge grades for `contestant` across every stored match.
    fn judge_accuracy(&self, contestant: &str) -> Result<Accuracy, StoreError>;
    fn career(&self, contestant: &str) -> Result<Option<Career>, StoreError>;
    fn save_career(&mut self, career: &Career) -> Result<(), StoreError>;
    fn complete_match(&mut self, match_id: &str, end: &MatchEnd) -> Result<(), StoreError>;
}

/// Store kept in process memory; used for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    matches: BTreeMap<String, (MatchInfo, Option<MatchEnd>)>,
    actions: Vec<ActionLogRow>,
    snapshots: Vec<RatingSnapshot>,
    participants: Vec<ParticipantRow>,
    verdicts: BTreeMap<(String, u64), Verdict>,
    careers: BTreeMap<String, Career>,
}

impl MemoryStore {
    pub fn match_info(&self, match_id: &str) -> Option<&MatchInfo> {
        self.matches.get(match_id).map(|(info, _)| info)
    }

    pub fn match_end(&self, match_id: &str) -> Option<&MatchEnd> {
        self.matches.get(match_id).and_then(|(_, end)| end.as_ref())
    }

    pub fn snapshots(&self) -> &[RatingSnapshot] {
        &self.snapshots
    }

    pub fn participants(&self) -> &[ParticipantRow] {
        &self.participants
    }

    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.values()
    }
}

impl MatchStore for MemoryStore {
    fn begin_match(&mut self, info: &MatchInfo) -> Result<(), StoreError> {
        self.matches.insert(info.match_id.clone(), (info.clone(), None));
        Ok(())
    }

    fn append_action(&mut self, row: &ActionLogRow) -> Result<(), StoreError> {
        self.actions.push(row.clone());
        Ok(())
    }

    fn rating_snapshot(&mut self, snapshot: &RatingSnapshot) -> Result<(), StoreError> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn record_participant(&mut self, row: &ParticipantRow) -> Result<(), StoreError> {
        self.participants.push(row.clone());
        Ok(())
    }

    fn action_rows(&self, match_id: &str) -> Result<Vec<ActionLogRow>, StoreError> {
        let mut rows: Vec<ActionLogRow> = self
            .actions
            .iter()
            .filter(|r| r.match_id == match_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.seq);
        Ok(rows)
    }

    fn upsert_verdict(&mut self, verdict: &Verdict) -> Result<(), StoreError> {
        self.verdicts
            .insert((verdict.match_id.clone(), verdict.seq), verdict.clone());
        Ok(())
    }

    fn judge_accuracy(&self, contestant: &str) -> Result<Accuracy, StoreError> {
        let mut acc = Accuracy::default();
        for v in self.verdicts.values().filter(|v| v.actor == contestant) {
            acc.add(v.is_top_action);
        }
        Ok(acc)
    }

    fn career(&self, contestant: &str) -> Result<Option<Career>, StoreError> {
        Ok(self.careers.get(contestant).cloned())
    }

    fn save_career(&mut self, career: &Career) -> Result<(), StoreError> {
        self.careers.insert(career.name.clone(), career.clone());
        Ok(())
    }

    fn complete_match(&mut self, match_id: &str, end: &MatchEnd) -> Result<(), StoreError> {
        match self.matches.get_mut(match_id) {
            Some((_, slot)) => {
                *slot = Some(end.clone());
                Ok(())
            }
            None => Err(StoreError::PersistenceUnavailable(format!(
                "unknown match {match_id}"
            ))),
        }
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS matches (
    match_id TEXT NOT NULL PRIMARY KEY,
    contestant_a TEXT NOT NULL,
    contestant_b TEXT NOT NULL,
    base_seed TEXT NOT NULL,
    pairs INTEGER NOT NULL,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    status TEXT,
    status_json TEXT
);
CREATE TABLE IF NOT EXISTS action_log (
    match_id TEXT NOT NULL,
    seq INTEGER NOT NULL,
    pair_index INTEGER NOT NULL,
    hand_id TEXT NOT NULL,
    actor TEXT NOT NULL,
    street TEXT NOT NULL,
    action TEXT NOT NULL,
    amount INTEGER,
    fallback INTEGER NOT NULL,
    row_json TEXT NOT NULL,
    PRIMARY KEY (match_id, seq)
);
CREATE TABLE IF NOT EXISTS rating_points (
    match_id TEXT NOT NULL,
    phase TEXT NOT NULL,
    pair_index INTEGER,
    elo_a REAL NOT NULL,
    elo_b REAL NOT NULL,
    glicko_json TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS participants (
    match_id TEXT NOT NULL,
    label TEXT NOT NULL,
    name TEXT NOT NULL,
    start_bank INTEGER NOT NULL,
    end_bank INTEGER NOT NULL,
    wins INTEGER NOT NULL,
    hands INTEGER NOT NULL,
    net_chips INTEGER NOT NULL,
    stats_json TEXT NOT NULL,
    tally_json TEXT NOT NULL,
    PRIMARY KEY (match_id, label)
);
CREATE TABLE IF NOT EXISTS verdicts (
    match_id TEXT NOT NULL,
    seq INTEGER NOT NULL,
    actor TEXT NOT NULL,
    is_top INTEGER NOT NULL,
    ev_gap_bb REAL NOT NULL,
    verdict_json TEXT NOT NULL,
    PRIMARY KEY (match_id, seq)
);
CREATE TABLE IF NOT EXISTS careers (
    name TEXT NOT NULL PRIMARY KEY,
    elo REAL NOT NULL,
    glicko_json TEXT NOT NULL,
    matches INTEGER NOT NULL,
    hands INTEGER NOT NULL
);
";

/// SQLite-backed store. Tables are created on open.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::PersistenceUnavailable(format!(
                        "create {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl MatchStore for SqliteStore {
    fn begin_match(&mut self, info: &MatchInfo) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO matches (match_id, contestant_a, contestant_b, base_seed, pairs, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                info.match_id,
                info.contestants[0],
                info.contestants[1],
                info.base_seed.to_string(),
                info.pairs,
                info.started_at
            ],
        )?;
        Ok(())
    }

    fn append_action(&mut self, row: &ActionLogRow) -> Result<(), StoreError> {
        let json = serde_json::to_string(row)?;
        self.conn.execute(
            "INSERT INTO action_log (match_id, seq, pair_index, hand_id, actor, street, action, amount, fallback, row_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                row.match_id,
                row.seq as i64,
                row.pair_index,
                row.hand_id,
                row.actor,
                row.street.to_string(),
                row.action.as_str(),
                row.amount,
                row.fallback,
                json
            ],
        )?;
        Ok(())
    }

    fn rating_snapshot(&mut self, snapshot: &RatingSnapshot) -> Result<(), StoreError> {
        let (phase, pair_index) = snapshot.phase.parts();
        let glicko = serde_json::to_string(&snapshot.glicko)?;
        self.conn.execute(
            "INSERT INTO rating_points (match_id, phase, pair_index, elo_a, elo_b, glicko_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                snapshot.match_id,
                phase,
                pair_index,
                snapshot.elo[0],
                snapshot.elo[1],
                glicko
            ],
        )?;
        Ok(())
    }

    fn record_participant(&mut self, row: &ParticipantRow) -> Result<(), StoreError> {
        let stats = serde_json::to_string(&row.stats)?;
        let tally = serde_json::to_string(&row.tally)?;
        self.conn.execute(
            "INSERT INTO participants (match_id, label, name, start_bank, end_bank, wins, hands, net_chips, stats_json, tally_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(match_id, label) DO UPDATE SET
                name = excluded.name,
                end_bank = excluded.end_bank,
                wins = excluded.wins,
                hands = excluded.hands,
                net_chips = excluded.net_chips,
                stats_json = excluded.stats_json,
                tally_json = excluded.tally_json",
            params![
                row.match_id,
                row.label,
                row.name,
                row.start_bank,
                row.end_bank,
                row.wins,
                row.stats.overall.hands,
                row.stats.overall.net_chips,
                stats,
                tally
            ],
        )?;
        Ok(())
    }

    fn action_rows(&self, match_id: &str) -> Result<Vec<ActionLogRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT row_json FROM action_log WHERE match_id = ?1 ORDER BY seq")?;
        let raw = stmt
            .query_map(params![match_id], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut rows = Vec::with_capacity(raw.len());
        for json in raw {
            rows.push(serde_json::from_str(&json)?);
        }
        Ok(rows)
    }

    fn upsert_verdict(&mut self, verdict: &Verdict) -> Result<(), StoreError> {
        let json = serde_json::to_string(verdict)?;
        self.conn.execute(
            "INSERT INTO verdicts (match_id, seq, actor, is_top, ev_gap_bb, verdict_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(match_id, seq) DO UPDATE SET
                actor = excluded.actor,
                is_top = excluded.is_top,
                ev_gap_bb = excluded.ev_gap_bb,
                verdict_json = excluded.verdict_json",
            params![
                verdict.match_id,
                verdict.seq as i64,
                verdict.actor,
                verdict.is_top_action,
                verdict.ev_gap_bb,
                json
            ],
        )?;
        Ok(())
    }

    fn judge_accuracy(&self, contestant: &str) -> Result<Accuracy, StoreError> {
        let (good, total): (i64, i64) = self.conn.query_row(
            "SELECT COALESCE(SUM(is_top), 0), COUNT(*) FROM verdicts WHERE actor = ?1",
            params![contestant],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(Accuracy {
            good: u32::try_from(good).unwrap_or(u32::MAX),
            total: u32::try_from(total).unwrap_or(u32::MAX),
        })
    }

    fn career(&self, contestant: &str) -> Result<Option<Career>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT elo, glicko_json, matches, hands FROM careers WHERE name = ?1",
                params![contestant],
                |r| {
                    Ok((
                        r.get::<_, f64>(0)?,
                        r.get::<_, String>(1)?,
                        r.get::<_, u32>(2)?,
                        r.get::<_, u32>(3)?,
                    ))
                },
            )
            .optional()?;
        match row {
            None => Ok(None),
            Some((elo, glicko, matches, hands)) => Ok(Some(Career {
                name: contestant.to_string(),
                elo,
                glicko: serde_json::from_str(&glicko)?,
                matches,
                hands,
            })),
        }
    }

    fn save_career(&mut self, career: &Career) -> Result<(), StoreError> {
        let glicko = serde_json::to_string(&career.glicko)?;
        self.conn.execute(
            "INSERT INTO careers (name, elo, glicko_json, matches, hands)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                elo = excluded.elo,
                glicko_json = excluded.glicko_json,
                matches = excluded.matches,
                hands = excluded.hands",
            params![career.name, career.elo, glicko, career.matches, career.hands],
        )?;
        Ok(())
    }

    fn complete_match(&mut self, match_id: &str, end: &MatchEnd) -> Result<(), StoreError> {
        let json = serde_json::to_string(end)?;
        let ended_at = chrono::Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE matches SET ended_at = ?2, status = ?3, status_json = ?4 WHERE match_id = ?1",
            params![match_id, ended_at, end.as_str(), json],
        )?;
        if updated == 0 {
            return Err(StoreError::PersistenceUnavailable(format!(
                "unknown match {match_id}"
            )));
        }
        Ok(())
    }
}

/// Best-effort front for a [`MatchStore`]. The first failed call logs a
/// warning, drops the store and flips the recorder into degraded mode; every
/// later call is a no-op.
pub struct Recorder<'s> {
    store: Option<&'s mut dyn MatchStore>,
    degraded: bool,
}

impl<'s> Recorder<'s> {
    pub fn new(store: &'s mut dyn MatchStore) -> Self {
        Self {
            store: Some(store),
            degraded: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn run<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut (dyn MatchStore + 's)) -> Result<T, StoreError>,
    ) -> Option<T> {
        let store = self.store.as_deref_mut()?;
        match f(store) {
            Ok(v) => Some(v),
            Err(err) => {
                tracing::warn!(operation, %err, "persistence failed, continuing without a store");
                self.store = None;
                self.degraded = true;
                None
            }
        }
    }

    pub fn begin_match(&mut self, info: &MatchInfo) {
        self.run("begin_match", |s| s.begin_match(info));
    }

    pub fn append_action(&mut self, row: &ActionLogRow) {
        self.run("append_action", |s| s.append_action(row));
    }

    pub fn rating_snapshot(&mut self, snapshot: &RatingSnapshot) {
        self.run("rating_snapshot", |s| s.rating_snapshot(snapshot));
    }

    pub fn record_participant(&mut self, row: &ParticipantRow) {
        self.run("record_participant", |s| s.record_participant(row));
    }

    pub fn action_rows(&mut self, match_id: &str) -> Option<Vec<ActionLogRow>> {
        self.run("action_rows", |s| s.action_rows(match_id))
    }

    pub fn upsert_verdict(&mut self, verdict: &Verdict) {
        self.run("upsert_verdict", |s| s.upsert_verdict(verdict));
    }

    pub fn judge_accuracy(&mut self, contestant: &str) -> Option<Accuracy> {
        self.run("judge_accuracy", |s| s.judge_accuracy(contestant))
    }

    pub fn career(&mut self, contestant: &str) -> Option<Career> {
        self.run("career", |s| s.career(contestant)).flatten()
    }

    pub fn save_career(&mut self, career: &Career) {
        self.run("save_career", |s| s.save_career(career));
    }

    pub fn complete_match(&mut self, match_id: &str, end: &MatchEnd) {
        self.run("complete_match", |s| s.complete_match(match_id, end));
    }
}
