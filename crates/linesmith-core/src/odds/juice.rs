// Seeded juice (vig) around the standard -110.

use serde::Serialize;

use crate::odds::rng::SeededRandom;

pub const STANDARD_JUICE: f64 = -110.0;

pub const SPREAD_JUICE_MIN: i32 = -125;
pub const SPREAD_JUICE_MAX: i32 = -100;
pub const TOTAL_JUICE_MIN: i32 = -120;
pub const TOTAL_JUICE_MAX: i32 = -105;

/// Spreads at or below this size get the lopsided short-line juice.
const SHORT_SPREAD: f64 = 1.5;
/// Spreads at or above this size get the near-symmetric long-line juice.
const LONG_SPREAD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpreadJuice {
    pub favorite: i32,
    pub underdog: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalJuice {
    pub over: i32,
    pub under: i32,
}

/// Juice for both sides of a spread.
///
/// - `≤ 1.5`: favorite in `[-125, -115]`, underdog in `[-115, -105]`.
/// - `≥ 10`: both sides in `[-116, -108]`, at most two cents apart.
/// - otherwise: a shared ±8 offset around -110, mirrored between the sides.
pub fn generate_spread_juice(abs_spread: f64, seed_key: &str) -> SpreadJuice {
    let mut rng = SeededRandom::from_seed(seed_key);
    let (favorite, underdog) = if abs_spread <= SHORT_SPREAD {
        (rng.range(-125.0, -115.0), rng.range(-115.0, -105.0))
    } else if abs_spread >= LONG_SPREAD {
        let base = -112.0 + rng.symmetric(4.0);
        let other = (base + rng.symmetric(2.0)).clamp(-116.0, -108.0);
        (base, other)
    } else {
        let offset = rng.symmetric(8.0).round();
        (STANDARD_JUICE - offset, STANDARD_JUICE + offset)
    };
    SpreadJuice {
        favorite: clamp_price(favorite, SPREAD_JUICE_MIN, SPREAD_JUICE_MAX),
        underdog: clamp_price(underdog, SPREAD_JUICE_MIN, SPREAD_JUICE_MAX),
    }
}

/// Over/under juice: a ±6 offset around -110, mirrored, clamped to `[-120, -105]`.
pub fn generate_total_juice(seed_key: &str) -> TotalJuice {
    let mut rng = SeededRandom::from_seed(seed_key);
    let offset = rng.symmetric(6.0).round();
    TotalJuice {
        over: clamp_price(STANDARD_JUICE + offset, TOTAL_JUICE_MIN, TOTAL_JUICE_MAX),
        under: clamp_price(STANDARD_JUICE - offset, TOTAL_JUICE_MIN, TOTAL_JUICE_MAX),
    }
}

fn clamp_price(price: f64, min: i32, max: i32) -> i32 {
    (price.round() as i32).clamp(min, max)
}
