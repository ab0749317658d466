use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::Level;

use duelbench_ai::scripted::{ScriptedAgent, Step};
use duelbench_ai::{Agent, AgentError, Decision};
use duelbench_arena::logging::TestLogSubscriber;
use duelbench_arena::store::{Career, MatchInfo, ParticipantRow, RatingSnapshot, SnapshotPhase};
use duelbench_arena::{
    run_match, run_matrix, ArenaConfig, Contestant, MatchEnd, MatchStore, MemoryStore, SqliteStore, StopHandle,
    StopMode, StoreError,
};
use duelbench_engine::logger::{ActionLogRow, HandLogger, HandRecord};
use duelbench_engine::observation::Observation;
use duelbench_engine::rules::ActionKind;
use duelbench_judge::{Accuracy, Verdict};

fn config(pairs: u32, seed: u64) -> ArenaConfig {
    ArenaConfig {
        pairs,
        seed: Some(seed),
        ..ArenaConfig::default()
    }
}

fn stall_then(name: &str, secs: u64, reply: &str) -> Contestant {
    Contestant::from_agent(ScriptedAgent::new(
        name,
        [Step::Stall(
            Duration::from_secs(secs),
            Box::new(Step::Reply(Decision::new(reply))),
        )],
    ))
}

/// Shoves whenever it may raise, otherwise calls or checks.
struct Shover;

#[async_trait]
impl Agent for Shover {
    async fn decide(&self, obs: &Observation) -> Result<Decision, AgentError> {
        if obs.can(ActionKind::Raise) {
            Ok(Decision::raise_to(obs.max_raise_to))
        } else if obs.to_call > 0 {
            Ok(Decision::new("call"))
        } else {
            Ok(Decision::new("check"))
        }
    }

    fn name(&self) -> &str {
        "Shover"
    }
}

#[tokio::test]
async fn small_blind_fold_pays_the_big_blind_and_mirror_reuses_the_deal() {
    let a = Contestant::from_agent(ScriptedAgent::replies("FolderA", &["fold"]));
    let b = Contestant::from_agent(ScriptedAgent::replies("FolderB", &["fold"]));
    let mut store = MemoryStore::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.jsonl");
    let mut history = HandLogger::create(&path).unwrap();

    let report = run_match(&config(1, 42), &a, &b, &mut store, StopHandle::new().token(), Some(&mut history))
        .await
        .unwrap();
    drop(history);

    assert_eq!(report.end, MatchEnd::Completed);
    assert_eq!(report.pairs_played, 1);
    assert_eq!(report.hands_played, 2);
    // A lost 50 as SB, won 50 as BB
    assert_eq!(report.contestants[0].stats.small_blind.net_chips, -50);
    assert_eq!(report.contestants[0].stats.big_blind.net_chips, 50);
    assert_eq!(report.contestants[0].bank, 10_000);
    assert_eq!(report.contestants[1].bank, 10_000);
    assert_eq!(report.pairs.ties, 1);

    let rows = store.action_rows(&report.match_id).unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.action, ActionKind::Fold);
        assert_eq!(row.pot, 150);
        assert_eq!(row.to_call, 50);
        assert!(!row.fallback);
    }
    assert_eq!(rows[0].actor, "FolderA");
    assert_eq!(rows[1].actor, "FolderB");
    assert_eq!(rows[0].holes, rows[1].holes);

    let records: Vec<HandRecord> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].result.as_deref(), Some("BB wins 150"));
    assert_eq!(records[0].holes, records[1].holes);
    assert_eq!(records[0].seats, vec!["FolderA".to_string(), "FolderB".to_string()]);
    assert_eq!(records[1].seats, vec!["FolderB".to_string(), "FolderA".to_string()]);
}

#[tokio::test]
async fn chips_are_conserved_over_a_match() {
    let a = Contestant::builtin("baseline", 1).unwrap();
    let b = Contestant::builtin("random", 2).unwrap();
    let mut store = MemoryStore::default();
    let report = run_match(&config(12, 7), &a, &b, &mut store, StopHandle::new().token(), None)
        .await
        .unwrap();

    assert!(report.end.is_result());
    let [ra, rb] = &report.contestants;
    assert_eq!(ra.bank + rb.bank, 20_000);
    assert_eq!(ra.stats.overall.net_chips, -rb.stats.overall.net_chips);
    assert_eq!(ra.stats.overall.hands, report.hands_played);
    assert_eq!(report.hands_played, report.pairs_played * 2);
    assert!((ra.elo + rb.elo - 3_000.0).abs() < 1e-6);

    // start, one per pair, end
    assert_eq!(store.snapshots().len(), report.pairs_played as usize + 2);
    assert_eq!(store.snapshots()[0].phase, SnapshotPhase::Start);
    assert_eq!(store.snapshots().last().unwrap().phase, SnapshotPhase::End);
    assert_eq!(store.participants().len(), 2);

    let rows = store.action_rows(&report.match_id).unwrap();
    assert!(rows.iter().enumerate().all(|(i, r)| r.seq == i as u64));
    let tallied: u32 = report.contestants.iter().map(|c| c.tally.total()).sum();
    assert_eq!(tallied as usize, rows.len());
    assert_eq!(store.verdicts().count(), report.verdicts);
    assert_eq!(store.match_end(&report.match_id), Some(&report.end));
}

#[tokio::test]
async fn out_of_bounds_raise_falls_back_to_call() {
    let a = Contestant::from_agent(ScriptedAgent::new(
        "Clumsy",
        [Step::Reply(Decision::raise_to(199))],
    ));
    let b = Contestant::builtin("station", 0).unwrap();
    let mut store = MemoryStore::default();
    let report = run_match(&config(1, 5), &a, &b, &mut store, StopHandle::new().token(), None)
        .await
        .unwrap();

    let rows = store.action_rows(&report.match_id).unwrap();
    assert_eq!(rows[0].actor, "Clumsy");
    assert_eq!(rows[0].action, ActionKind::Call);
    assert!(rows[0].fallback);
    assert_eq!(report.contestants[0].fallbacks, 1);
}

#[tokio::test(start_paused = true)]
async fn immediate_stop_aborts_without_payout() {
    let a = stall_then("Sleeper", 60, "call");
    let b = Contestant::builtin("station", 0).unwrap();
    let mut store = MemoryStore::default();
    let handle = StopHandle::new();
    let cfg = ArenaConfig {
        decision_timeout_ms: 120_000,
        ..config(3, 9)
    };

    let run = run_match(&cfg, &a, &b, &mut store, handle.token(), None);
    let trigger = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.request(StopMode::Immediate);
    };
    let (report, ()) = tokio::join!(run, trigger);
    let report = report.unwrap();

    assert_eq!(report.end, MatchEnd::Aborted);
    assert!(!report.end.is_result());
    assert_eq!(report.pairs_played, 0);
    assert_eq!(report.contestants[0].bank, 10_000);
    assert_eq!(report.contestants[1].bank, 10_000);
    assert!(store.participants().is_empty());
    assert_eq!(store.match_end(&report.match_id), Some(&MatchEnd::Aborted));
}

#[tokio::test(start_paused = true)]
async fn graceful_stop_finishes_the_pair_in_flight() {
    let a = stall_then("Thinker", 5, "call");
    let b = Contestant::builtin("station", 0).unwrap();
    let mut store = MemoryStore::default();
    let handle = StopHandle::new();
    let cfg = config(5, 11);

    let run = run_match(&cfg, &a, &b, &mut store, handle.token(), None);
    let trigger = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.request(StopMode::Graceful);
    };
    let (report, ()) = tokio::join!(run, trigger);
    let report = report.unwrap();

    assert_eq!(report.end, MatchEnd::StoppedGracefully);
    assert!(report.end.is_result());
    assert_eq!(report.pairs_played, 1);
    assert_eq!(report.hands_played, 2);
    assert_eq!(store.participants().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_reply_times_out_into_fallback() {
    let a = stall_then("Slowpoke", 30, "raise");
    let b = Contestant::builtin("station", 0).unwrap();
    let mut store = MemoryStore::default();
    let cfg = ArenaConfig {
        decision_timeout_ms: 2_000,
        ..config(1, 13)
    };
    let report = run_match(&cfg, &a, &b, &mut store, StopHandle::new().token(), None)
        .await
        .unwrap();
    let rows = store.action_rows(&report.match_id).unwrap();
    assert!(rows[0].fallback);
    assert_eq!(rows[0].action, ActionKind::Call);
    assert_eq!(report.end, MatchEnd::Completed);
}

/// Memory store whose action log is broken.
#[derive(Default)]
struct BrokenLog {
    inner: MemoryStore,
}

impl MatchStore for BrokenLog {
    fn begin_match(&mut self, info: &MatchInfo) -> Result<(), StoreError> {
        self.inner.begin_match(info)
    }
    fn append_action(&mut self, _row: &ActionLogRow) -> Result<(), StoreError> {
        Err(StoreError::PersistenceUnavailable("disk full".into()))
    }
    fn rating_snapshot(&mut self, snapshot: &RatingSnapshot) -> Result<(), StoreError> {
        self.inner.rating_snapshot(snapshot)
    }
    fn record_participant(&mut self, row: &ParticipantRow) -> Result<(), StoreError> {
        self.inner.record_participant(row)
    }
    fn action_rows(&self, match_id: &str) -> Result<Vec<ActionLogRow>, StoreError> {
        self.inner.action_rows(match_id)
    }
    fn upsert_verdict(&mut self, verdict: &Verdict) -> Result<(), StoreError> {
        self.inner.upsert_verdict(verdict)
    }
    fn judge_accuracy(&self, contestant: &str) -> Result<Accuracy, StoreError> {
        self.inner.judge_accuracy(contestant)
    }
    fn career(&self, contestant: &str) -> Result<Option<Career>, StoreError> {
        self.inner.career(contestant)
    }
    fn save_career(&mut self, career: &Career) -> Result<(), StoreError> {
        self.inner.save_career(career)
    }
    fn complete_match(&mut self, match_id: &str, end: &MatchEnd) -> Result<(), StoreError> {
        self.inner.complete_match(match_id, end)
    }
}

#[tokio::test]
async fn persistence_failure_degrades_but_match_completes() {
    let logs = TestLogSubscriber::new();
    let _guard = tracing::subscriber::set_default(logs.registry());

    let a = Contestant::builtin("baseline", 1).unwrap();
    let b = Contestant::builtin("station", 2).unwrap();
    let mut store = BrokenLog::default();
    let report = run_match(&config(3, 21), &a, &b, &mut store, StopHandle::new().token(), None)
        .await
        .unwrap();

    assert!(report.persistence_degraded);
    assert!(report.end.is_result());
    assert_eq!(report.contestants[0].bank + report.contestants[1].bank, 20_000);
    // the store was dropped at the first failure
    assert!(store.inner.participants().is_empty());
    assert_eq!(store.inner.match_end(&report.match_id), None);

    let warnings = logs.at_level(Level::WARN);
    assert_eq!(
        warnings
            .iter()
            .filter(|e| e.message.contains("persistence failed"))
            .count(),
        1
    );
    assert!(warnings.iter().any(|e| e.field("operation") == Some("append_action")));
}

#[tokio::test]
async fn probe_policy_is_reproducible_for_a_seed() {
    let cfg = ArenaConfig {
        probe_probability: Some(0.5),
        ..config(4, 77)
    };
    let mut kinds = Vec::new();
    for _ in 0..2 {
        let a = Contestant::builtin("random", 3).unwrap();
        let b = Contestant::new("Station", Arc::new(ScriptedAgent::calling_station()));
        let mut store = MemoryStore::default();
        let report = run_match(&cfg, &a, &b, &mut store, StopHandle::new().token(), None)
            .await
            .unwrap();
        let rows = store.action_rows(&report.match_id).unwrap();
        kinds.push(rows.iter().map(|r| (r.action, r.amount)).collect::<Vec<_>>());
    }
    assert_eq!(kinds[0], kinds[1]);
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let a = Contestant::builtin("station", 0).unwrap();
    let b = Contestant::builtin("station", 1).unwrap();
    let mut store = MemoryStore::default();
    let res = run_match(&config(1, 1), &a, &b, &mut store, StopHandle::new().token(), None).await;
    assert!(matches!(res, Err(duelbench_arena::ArenaError::Config(_))));
}

#[tokio::test]
async fn sqlite_store_keeps_rows_and_careers() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("arena.db");
    let a = Contestant::from_agent(Shover);
    let b = Contestant::builtin("station", 0).unwrap();

    let report = {
        let mut store = SqliteStore::open(&db).unwrap();
        run_match(&config(2, 31), &a, &b, &mut store, StopHandle::new().token(), None)
            .await
            .unwrap()
    };
    assert!(!report.persistence_degraded);

    let store = SqliteStore::open(&db).unwrap();
    let rows = store.action_rows(&report.match_id).unwrap();
    let tallied: u32 = report.contestants.iter().map(|c| c.tally.total()).sum();
    assert_eq!(rows.len(), tallied as usize);
    let career = store.career("Shover").unwrap().unwrap();
    assert_eq!(career.matches, 1);
    assert_eq!(career.hands, report.hands_played);
    assert!((career.glicko.rating - report.contestants[0].glicko.rating).abs() < 1e-9);
    assert!((career.glicko.rd - report.contestants[0].glicko.rd).abs() < 1e-9);
    let acc = store.judge_accuracy("Shover").unwrap();
    assert_eq!(acc, report.contestants[0].accuracy);
}

#[tokio::test]
async fn matrix_plays_every_pairing_and_carries_careers() {
    let contestants = vec![
        Contestant::builtin("baseline", 1).unwrap(),
        Contestant::builtin("random", 2).unwrap(),
        Contestant::builtin("station", 3).unwrap(),
    ];
    let mut store = MemoryStore::default();
    let report = run_matrix(&config(2, 5), &contestants, &mut store, StopHandle::new().token())
        .await
        .unwrap();

    assert!(!report.interrupted);
    assert_eq!(report.matches.len(), 3);
    assert_eq!(report.standings.len(), 3);
    assert!(report.standings.iter().all(|s| s.matches == 2));
    assert!(report
        .standings
        .windows(2)
        .all(|w| w[0].glicko.rating >= w[1].glicko.rating));
    for c in &contestants {
        assert_eq!(store.career(&c.name).unwrap().unwrap().matches, 2);
    }
    let net: i64 = report.standings.iter().map(|s| s.net_chips).sum();
    assert_eq!(net, 0);
}
