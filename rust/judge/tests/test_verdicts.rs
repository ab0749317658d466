use duelbench_engine::cards::{parse_cards, Card};
use duelbench_engine::logger::{ActionLogRow, Street};
use duelbench_engine::player::Seat;
use duelbench_engine::rules::ActionKind;
use duelbench_judge::verdict::Spot;
use duelbench_judge::{accuracy_by_actor, judge_row, judge_rows, JudgeConfig};

fn pair(s: &str) -> [Card; 2] {
    let v = parse_cards(s).unwrap();
    [v[0], v[1]]
}

fn river_row(seq: u64, actor: &str, hero: &str, board: &str, to_call: u32, action: ActionKind) -> ActionLogRow {
    ActionLogRow {
        match_id: "m-1".into(),
        seq,
        pair_index: 0,
        hand_id: format!("h-{seq}"),
        actor: actor.into(),
        seat: Seat::BigBlind,
        street: Street::River,
        action,
        amount: (action == ActionKind::Raise).then_some(760),
        fallback: false,
        pot: 1_000,
        current_bet: if to_call > 0 { to_call } else { 0 },
        to_call,
        min_raise_to: 100,
        max_raise_to: 9_000,
        stacks: [9_000, 9_000],
        board: parse_cards(board).unwrap(),
        holes: [pair("7c 7d"), pair(hero)],
    }
}

const NUT_HERO: &str = "As Ks";
const NUT_BOARD: &str = "Qs Js Ts 2d 3c";

#[test]
fn calling_with_the_nuts_is_the_top_action() {
    let row = river_row(1, "alpha", NUT_HERO, NUT_BOARD, 500, ActionKind::Call);
    let v = judge_row(&row, 100, &JudgeConfig::default()).unwrap();
    assert_eq!(v.spot, Spot::FacingBet);
    assert_eq!(v.equity, 1.0);
    assert_eq!(v.best, ActionKind::Call);
    assert!((v.ev_chosen - 1_500.0).abs() < 1e-9);
    assert_eq!(v.ev_gap_bb, 0.0);
    assert!(v.is_top_action);
}

#[test]
fn folding_the_nuts_costs_the_whole_call_ev() {
    let row = river_row(2, "alpha", NUT_HERO, NUT_BOARD, 500, ActionKind::Fold);
    let v = judge_row(&row, 100, &JudgeConfig::default()).unwrap();
    assert_eq!(v.best, ActionKind::Call);
    assert_eq!(v.ev_chosen, 0.0);
    assert!((v.ev_gap_bb - 15.0).abs() < 1e-9);
    assert!(!v.is_top_action);
}

#[test]
fn checking_the_nuts_when_unopened_misses_value() {
    let row = river_row(3, "beta", NUT_HERO, NUT_BOARD, 0, ActionKind::Check);
    let v = judge_row(&row, 100, &JudgeConfig::default()).unwrap();
    assert_eq!(v.spot, Spot::Unopened);
    assert_eq!(v.best, ActionKind::Raise);
    // bet = round(0.66 * 1000) = 660; 0.35*1000 + 0.65*(1000 + 1320)
    assert!((v.ev_best - 1_858.0).abs() < 1e-9);
    assert_eq!(v.best_amount, Some(660));
    assert!(!v.is_top_action);
}

#[test]
fn even_ev_prefers_call_and_raise() {
    // board plays for everyone, so equity is exactly one half
    let mut facing = river_row(5, "alpha", "2c 3d", "As Ks Qs Js Ts", 500, ActionKind::Fold);
    facing.pot = 0;
    let v = judge_row(&facing, 100, &JudgeConfig::default()).unwrap();
    assert_eq!(v.equity, 0.5);
    assert_eq!(v.ev_best, 0.0);
    assert_eq!(v.best, ActionKind::Call);
    assert!(v.is_top_action);

    let mut unopened = river_row(6, "alpha", "2c 3d", "As Ks Qs Js Ts", 0, ActionKind::Check);
    unopened.pot = 0;
    let always_folds = JudgeConfig {
        fold_equity: 1.0,
        ..JudgeConfig::default()
    };
    let v = judge_row(&unopened, 100, &always_folds).unwrap();
    assert_eq!(v.ev_best, 0.0);
    assert_eq!(v.best, ActionKind::Raise);
    assert_eq!(v.best_amount, Some(100));
    assert_eq!(v.ev_gap_bb, 0.0);
}

#[test]
fn rows_outside_the_graded_spots_are_skipped() {
    let mut flop = river_row(4, "alpha", NUT_HERO, NUT_BOARD, 500, ActionKind::Call);
    flop.street = Street::Flop;
    flop.board.truncate(3);
    assert!(judge_row(&flop, 100, &JudgeConfig::default()).is_none());

    let raise_facing_bet = river_row(5, "alpha", NUT_HERO, NUT_BOARD, 500, ActionKind::Raise);
    assert!(judge_row(&raise_facing_bet, 100, &JudgeConfig::default()).is_none());

    let fold_unopened = river_row(6, "alpha", NUT_HERO, NUT_BOARD, 0, ActionKind::Fold);
    assert!(judge_row(&fold_unopened, 100, &JudgeConfig::default()).is_none());
}

#[test]
fn accuracy_is_tallied_per_actor() {
    let rows = vec![
        river_row(1, "alpha", NUT_HERO, NUT_BOARD, 500, ActionKind::Call),
        river_row(2, "alpha", NUT_HERO, NUT_BOARD, 500, ActionKind::Fold),
        river_row(3, "beta", NUT_HERO, NUT_BOARD, 0, ActionKind::Raise),
    ];
    let verdicts = judge_rows(&rows, 100, &JudgeConfig::default());
    assert_eq!(verdicts.len(), 3);
    let acc = accuracy_by_actor(&verdicts);
    assert_eq!(acc["alpha"].good, 1);
    assert_eq!(acc["alpha"].total, 2);
    assert_eq!(acc["alpha"].rate(), Some(0.5));
    assert_eq!(acc["beta"].rate(), Some(1.0));
}
