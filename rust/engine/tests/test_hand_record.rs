use std::fs;

use duelbench_engine::engine::Engine;
use duelbench_engine::game::GameConfig;
use duelbench_engine::logger::{HandLogger, HandRecord};
use duelbench_engine::player::PlayerAction;

#[test]
fn hand_logger_writes_one_json_line_per_hand() {
    let dir = std::env::temp_dir().join(format!("duelbench-log-{}", std::process::id()));
    let path = dir.join("hands.jsonl");

    let mut logger = HandLogger::create(&path).unwrap();
    for (i, seed) in [5u64, 6].into_iter().enumerate() {
        let mut hand = Engine::from_seed(format!("duel-{i}A"), GameConfig::default(), seed).unwrap();
        hand.apply(PlayerAction::Fold).unwrap();
        let outcome = hand.outcome().unwrap();
        logger.write(&hand.hand_record(Some(&outcome))).unwrap();
    }
    assert_eq!(logger.written(), 2);

    let text = fs::read_to_string(&path).unwrap();
    let records: Vec<HandRecord> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].hand_id, "duel-0A");
    assert_eq!(records[1].seed, Some(6));
    assert_eq!(records[0].result.as_deref(), Some("BB wins 150"));
    assert!(records[0].ts.is_some(), "timestamp is injected on write");
    assert_eq!(records[0].actions.len(), 1);

    let _ = fs::remove_dir_all(dir);
}
