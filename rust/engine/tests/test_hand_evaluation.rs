use duelbench_engine::cards::{parse_cards, Card, Rank as R, Suit as S};
use duelbench_engine::hand::{compare_hands, evaluate_hand, raw_score, Category};

fn c(s: S, r: R) -> Card {
    Card { suit: s, rank: r }
}

fn eval(s: &str) -> duelbench_engine::hand::HandStrength {
    evaluate_hand(&parse_cards(s).unwrap())
}

#[test]
fn detects_royal_flush() {
    let cards = [
        c(S::Hearts, R::Ten),
        c(S::Hearts, R::Jack),
        c(S::Hearts, R::Queen),
        c(S::Hearts, R::King),
        c(S::Hearts, R::Ace),
        c(S::Clubs, R::Two),
        c(S::Diamonds, R::Three),
    ];
    let hs = evaluate_hand(&cards);
    assert_eq!(hs.category, Category::StraightFlush);
    assert_eq!(hs.kickers[0], 14);
}

#[test]
fn category_ordering_is_correct() {
    let quads = eval("Ac Ad Ah As Kc Qd 2h");
    let full_house = eval("Kc Kd Kh Qc Qd 2h 3s");
    assert_eq!(quads.category, Category::FourOfAKind);
    assert_eq!(full_house.category, Category::FullHouse);
    assert!(compare_hands(&quads, &full_house).is_gt());
}

#[test]
fn accepts_five_and_six_card_inputs() {
    assert_eq!(eval("9c 9d 4h 4s Kc").category, Category::TwoPair);
    assert_eq!(eval("5h 6h 7h 8h 9h").category, Category::StraightFlush);
    let six = eval("Qd Qs Qh 8c 8d 2s");
    assert_eq!(six.category, Category::FullHouse);
    assert_eq!(six.kickers, [12, 8, 0, 0, 0]);
}

#[test]
fn flush_uses_best_five_of_suit() {
    let h = eval("Ah 9h 7h 4h 3h 2h Kc");
    assert_eq!(h.category, Category::Flush);
    assert_eq!(h.kickers, [14, 9, 7, 4, 3]);
}

#[test]
fn straight_beats_three_of_a_kind() {
    let straight = eval("5c 6d 7h 8s 9c 2d 2h");
    let trips = eval("Ac Ad Ah Ks 9c 2d 3h");
    assert_eq!(straight.category, Category::Straight);
    assert!(compare_hands(&straight, &trips).is_gt());
}

#[test]
fn kickers_break_ties_and_identical_strengths_tie() {
    let ak = eval("Ac Kd 8h 8s 5c 3d 2h");
    let aq = eval("As Qd 8c 8d 5c 3d 2h");
    assert!(compare_hands(&ak, &aq).is_gt(), "king kicker outranks queen kicker");

    let a = eval("Ac 4d Ts Js Qs Ks 2h");
    let b = eval("Ad 3c Ts Js Qs Ks 2h");
    assert!(compare_hands(&a, &b).is_eq(), "same broadway straight ties");
}

#[test]
fn quads_kicker_comes_from_best_remaining_card() {
    let h = eval("7c 7d 7h 7s Kc Kd 2h");
    assert_eq!(h.kickers, [7, 13, 0, 0, 0]);
}

#[test]
fn raw_score_agrees_with_structured_comparison() {
    let boards = [
        "Ac Kd 8h 8s 5c 3d 2h",
        "As Qd 8c 8d 5c 3d 2h",
        "Kc Kd 9h 9s 8c 8d 2h",
        "Kc Kd 9h 9s 8c 7d 2h",
        "7c 7d 7h 4s 4c 4d Ah",
        "Ac 2d 3h 4s 5c Kd Qh",
        "2c 3c 4c 5c 6c Ad Ah",
        "Ah 9h 7h 4h 3h 2h Kc",
    ];
    for x in boards {
        for y in boards {
            let (cx, cy) = (parse_cards(x).unwrap(), parse_cards(y).unwrap());
            assert_eq!(
                compare_hands(&evaluate_hand(&cx), &evaluate_hand(&cy)),
                raw_score(&cx).cmp(&raw_score(&cy)),
                "{x} vs {y}"
            );
        }
    }
}
