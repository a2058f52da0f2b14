// Spread to moneyline conversion.

use crate::odds::rng::SeededRandom;

/// Most negative favorite price we will print.
pub const FAVORITE_FLOOR: f64 = -5000.0;
/// Most generous underdog price we will print.
pub const UNDERDOG_CEILING: f64 = 5000.0;
/// Underdogs never drop below even money.
pub const UNDERDOG_FLOOR: f64 = 100.0;

/// Pick'em price before jitter, and the jitter half-width.
pub const PICK_BASE_PRICE: f64 = -120.0;
pub const PICK_JITTER: f64 = 3.0;

/// `(spread, favorite, underdog)` breakpoints, interpolated linearly.
///
/// Small spreads cluster near even money; past a touchdown the favorite's
/// price runs away faster than the underdog's payout grows.
const MONEYLINE_TABLE: [(f64, f64, f64); 7] = [
    (0.0, -110.0, 100.0),
    (1.5, -122.0, 102.0),
    (3.0, -150.0, 130.0),
    (4.5, -185.0, 160.0),
    (7.0, -250.0, 210.0),
    (10.0, -330.0, 265.0),
    (15.0, -433.0, 340.0),
];

/// Extra favorite / underdog price per point beyond the last breakpoint.
const TAIL_FAVORITE_SLOPE: f64 = -40.0;
const TAIL_UNDERDOG_SLOPE: f64 = 20.0;

/// Table prices for a spread magnitude, before vig.
pub fn table_prices(abs_spread: f64) -> (f64, f64) {
    let last = MONEYLINE_TABLE[MONEYLINE_TABLE.len() - 1];
    if abs_spread >= last.0 {
        let extra = abs_spread - last.0;
        return (
            last.1 + TAIL_FAVORITE_SLOPE * extra,
            last.2 + TAIL_UNDERDOG_SLOPE * extra,
        );
    }
    for pair in MONEYLINE_TABLE.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if abs_spread <= hi.0 {
            let t = (abs_spread - lo.0) / (hi.0 - lo.0);
            return (lo.1 + (hi.1 - lo.1) * t, lo.2 + (hi.2 - lo.2) * t);
        }
    }
    (last.1, last.2)
}

/// American odds for one side of a spread.
///
/// A pick'em (`abs_spread == 0`) prices both sides near -120 with a seeded
/// ±3 jitter. Otherwise the table price is widened by `1 + vig/2` (favorite
/// more negative, underdog payout smaller) and clamped to printable bounds.
pub fn convert_spread_to_moneyline(
    abs_spread: f64,
    is_favorite: bool,
    vig: f64,
    seed_key: &str,
) -> i32 {
    let abs_spread = if abs_spread.is_finite() {
        abs_spread.abs()
    } else {
        0.0
    };

    if abs_spread == 0.0 {
        let mut rng = SeededRandom::from_seed(seed_key);
        return (PICK_BASE_PRICE + rng.symmetric(PICK_JITTER)).round() as i32;
    }

    let vig = if vig.is_finite() { vig.max(0.0) } else { 0.0 };
    let multiplier = 1.0 + vig * 0.5;
    let (favorite, underdog) = table_prices(abs_spread);

    if is_favorite {
        (favorite * multiplier).clamp(FAVORITE_FLOOR, -100.0).round() as i32
    } else {
        (underdog / multiplier)
            .clamp(UNDERDOG_FLOOR, UNDERDOG_CEILING)
            .round() as i32
    }
}
