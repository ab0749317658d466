use crate::player::Seat;

/// Net chip change per seat, `[sb, bb]`, for a pot built from `invested`.
///
/// The winner collects the whole pot, so its delta is the opponent's
/// investment. A split hands each side half; the odd chip goes to the small
/// blind.
pub fn settle(invested: [u32; 2], winner: Option<Seat>) -> [i64; 2] {
    let pot = i64::from(invested[0]) + i64::from(invested[1]);
    let paid = [i64::from(invested[0]), i64::from(invested[1])];
    let won = match winner {
        Some(Seat::SmallBlind) => [pot, 0],
        Some(Seat::BigBlind) => [0, pot],
        None => {
            let half = pot / 2;
            [half + pot % 2, half]
        }
    };
    [won[0] - paid[0], won[1] - paid[1]]
}

/// Chips one side has put in that the other never matched.
pub fn uncalled(invested: [u32; 2]) -> Option<(Seat, u32)> {
    match invested[0].cmp(&invested[1]) {
        std::cmp::Ordering::Greater => Some((Seat::SmallBlind, invested[0] - invested[1])),
        std::cmp::Ordering::Less => Some((Seat::BigBlind, invested[1] - invested[0])),
        std::cmp::Ordering::Equal => None,
    }
}
