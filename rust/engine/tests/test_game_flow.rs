use duelbench_engine::cards::parse_cards;
use duelbench_engine::deck::Deck;
use duelbench_engine::engine::{Engine, Transition, MAX_ACTIONS_PER_STREET};
use duelbench_engine::errors::GameError;
use duelbench_engine::game::{Ending, GameConfig};
use duelbench_engine::logger::Street;
use duelbench_engine::player::{PlayerAction as A, Seat};
use duelbench_engine::rules::ActionKind as K;

// SB hole, BB hole, flop, turn, river
fn stacked(order: &str) -> Deck {
    Deck::stacked(parse_cards(order).unwrap())
}

fn aces_vs_kings() -> Engine {
    let deck = stacked("As Ah Kd Kc 2c 7d 9h Js 3c");
    Engine::new("t-1", GameConfig::default(), deck).unwrap()
}

fn check_down(hand: &mut Engine) {
    while !hand.is_complete() {
        let action = if hand.to_call() > 0 { A::Call } else { A::Check };
        hand.apply(action).unwrap();
    }
}

#[test]
fn small_blind_fold_preflop_pays_big_blind() {
    let mut hand = aces_vs_kings();
    assert_eq!(hand.pot(), 150);
    assert_eq!(hand.apply(A::Fold).unwrap(), Transition::Complete);

    let o = hand.outcome().unwrap();
    assert_eq!(o.winner, Some(Seat::BigBlind));
    assert_eq!(o.pot, 150);
    assert_eq!(o.bb_delta, 50);
    assert_eq!(o.sb_delta, -50);
    assert_eq!(o.ending, Ending::Fold);
    assert!(o.showdown.is_none());
}

#[test]
fn big_blind_gets_option_after_limp() {
    let mut hand = aces_vs_kings();
    assert_eq!(hand.legal_actions(), vec![K::Fold, K::Call, K::Raise]);
    assert_eq!(hand.apply(A::Call).unwrap(), Transition::Continue);

    assert_eq!(hand.to_act(), Some(Seat::BigBlind));
    assert_eq!(hand.legal_actions(), vec![K::Check, K::Raise]);
    assert_eq!(hand.apply(A::Check).unwrap(), Transition::NextStreet(Street::Flop));
}

#[test]
fn streets_deal_three_one_one_and_big_blind_acts_first() {
    let mut hand = aces_vs_kings();
    hand.apply(A::Call).unwrap();
    hand.apply(A::Check).unwrap();
    assert_eq!(hand.board().len(), 3);
    assert_eq!(hand.to_act(), Some(Seat::BigBlind));
    assert_eq!(hand.current_bet(), 0);
    assert_eq!(hand.min_raise(), 100);

    hand.apply(A::Check).unwrap();
    assert_eq!(hand.apply(A::Check).unwrap(), Transition::NextStreet(Street::Turn));
    assert_eq!(hand.board().len(), 4);
    hand.apply(A::Check).unwrap();
    assert_eq!(hand.apply(A::Check).unwrap(), Transition::NextStreet(Street::River));
    assert_eq!(hand.board().len(), 5);
    hand.apply(A::Check).unwrap();
    assert_eq!(hand.apply(A::Check).unwrap(), Transition::Complete);

    let o = hand.outcome().unwrap();
    assert_eq!(o.winner, Some(Seat::SmallBlind), "aces hold against kings");
    assert_eq!(o.pot, 200);
    assert_eq!(o.sb_delta, 100);
    assert_eq!(o.bb_delta, -100);
    let notes = o.showdown.unwrap().notes.unwrap();
    assert!(notes.contains("one pair"), "unexpected note {notes}");
}

#[test]
fn raise_bounds_are_enforced_without_touching_state() {
    let mut hand = aces_vs_kings();
    let bounds = hand.raise_bounds();
    assert_eq!(bounds.min_to, 200);
    assert_eq!(bounds.max_to, 10_000);

    let err = hand.apply(A::Raise(199)).unwrap_err();
    assert_eq!(
        err,
        GameError::RaiseOutOfBounds {
            amount: 199,
            min: 200,
            max: 10_000
        }
    );
    assert_eq!(hand.pot(), 150, "rejected raise must not move chips");
    assert_eq!(hand.to_act(), Some(Seat::SmallBlind));

    hand.apply(A::Raise(200)).unwrap();
    assert_eq!(hand.current_bet(), 200);
    assert_eq!(hand.to_call(), 100);
    assert_eq!(hand.raise_bounds().min_to, 300);
}

#[test]
fn reraise_increment_follows_last_raise() {
    let mut hand = aces_vs_kings();
    hand.apply(A::Raise(350)).unwrap();
    assert_eq!(hand.min_raise(), 250);
    assert_eq!(hand.raise_bounds().min_to, 600);
}

#[test]
fn check_facing_a_bet_is_illegal() {
    let mut hand = aces_vs_kings();
    let err = hand.apply(A::Check).unwrap_err();
    assert!(matches!(err, GameError::IllegalAction { action: K::Check, .. }));
}

#[test]
fn shove_and_call_runs_out_the_board() {
    let mut hand = aces_vs_kings();
    hand.apply(A::Raise(10_000)).unwrap();
    assert!(hand.player(Seat::SmallBlind).is_all_in());
    assert_eq!(hand.legal_actions(), vec![K::Fold, K::Call], "no raise against an all-in");

    assert_eq!(hand.apply(A::Call).unwrap(), Transition::Complete);
    assert_eq!(hand.board().len(), 5);
    let o = hand.outcome().unwrap();
    assert_eq!(o.pot, 20_000);
    assert_eq!(o.sb_delta, 10_000);
    assert_eq!(o.bb_delta, -10_000);
}

#[test]
fn short_blind_all_in_gets_refund_of_uncalled_chips() {
    let config = GameConfig {
        small_blind: 50,
        big_blind: 100,
        starting_stack: 80,
    };
    let mut hand = Engine::new("short", config, stacked("Kd Kc As Ah 2c 7d 9h Js 3c")).unwrap();
    assert!(hand.player(Seat::BigBlind).is_all_in());
    assert_eq!(hand.legal_actions(), vec![K::Fold, K::Call]);

    assert_eq!(hand.apply(A::Call).unwrap(), Transition::Complete);
    let o = hand.outcome().unwrap();
    assert_eq!(o.pot, 160);
    assert_eq!(o.bb_delta, 80);
    assert_eq!(o.sb_delta, -80);
}

#[test]
fn board_playing_splits_the_pot() {
    let deck = stacked("2c 3d 2h 3s Ts Js Qs Ks As");
    let mut hand = Engine::new("split", GameConfig::default(), deck).unwrap();
    check_down(&mut hand);
    let o = hand.outcome().unwrap();
    assert_eq!(o.winner, None);
    assert_eq!((o.sb_delta, o.bb_delta), (0, 0));
    let info = o.showdown.unwrap();
    assert_eq!(info.winners, vec![Seat::SmallBlind, Seat::BigBlind]);
}

#[test]
fn completed_hand_rejects_actions_and_open_hand_has_no_outcome() {
    let mut hand = aces_vs_kings();
    assert_eq!(hand.outcome().unwrap_err(), GameError::HandInProgress);
    hand.apply(A::Fold).unwrap();
    assert_eq!(hand.apply(A::Check).unwrap_err(), GameError::HandComplete);
    assert!(hand.legal_actions().is_empty());
    assert_eq!(hand.to_act(), None);
}

#[test]
fn street_cap_closes_the_street_and_returns_uncalled_chips() {
    let mut hand = aces_vs_kings();
    let mut to = 200;
    for _ in 0..MAX_ACTIONS_PER_STREET - 1 {
        assert_eq!(hand.apply(A::Raise(to)).unwrap(), Transition::Continue);
        to += 100;
    }
    let t = hand.apply(A::Raise(to)).unwrap();
    assert_eq!(t, Transition::NextStreet(Street::Flop));
    let sb = hand.player(Seat::SmallBlind);
    let bb = hand.player(Seat::BigBlind);
    assert_eq!(sb.invested(), bb.invested());
    assert_eq!(hand.pot(), 4_000);
    assert_eq!(sb.stack() + sb.invested(), 10_000);
}

#[test]
fn observation_reflects_the_actor_view() {
    let hand = aces_vs_kings();
    let obs = hand.observation().unwrap();
    assert_eq!(obs.seat, Seat::SmallBlind);
    assert_eq!(obs.hole_cards, [parse_cards("As").unwrap()[0], parse_cards("Ah").unwrap()[0]]);
    assert_eq!(obs.pot, 150);
    assert_eq!(obs.to_call, 50);
    assert_eq!(obs.min_raise_to, 200);
    assert_eq!(obs.max_raise_to, 10_000);
    assert_eq!(obs.stacks.hero, 9_950);
    assert_eq!(obs.stacks.villain, 9_900);
    assert!(obs.board.is_empty());
    assert_eq!(obs.history_len, 0);
}

#[test]
fn observation_blinds_carry_only_sb_and_bb() {
    let obs = aces_vs_kings().observation().unwrap();
    let json = serde_json::to_value(&obs).unwrap();
    assert_eq!(json["blinds"], serde_json::json!({ "sb": 50, "bb": 100 }));
}
