// Game total (over/under) line.

use crate::odds::power::PowerResult;
use crate::odds::rng::SeededRandom;
use crate::stats::round_to_half;

pub const DEFAULT_TOTAL: f64 = 220.0;
/// Below this combined average the inputs are treated as missing.
const MIN_PLAUSIBLE_TOTAL: f64 = 150.0;
pub const MIN_TOTAL: f64 = 180.0;
pub const MAX_TOTAL: f64 = 320.0;

const EARLY_SEASON_LAST_WEEK: u32 = 3;
const EARLY_SEASON_INFLATION: f64 = 1.02;

pub const DEFAULT_TOTAL_VARIANCE: f64 = 0.03;
const MAX_TOTAL_VARIANCE: f64 = 0.10;

/// Per-matchup inputs for [`calculate_total`].
#[derive(Debug, Clone)]
pub struct TotalContext {
    pub week_number: Option<u32>,
    pub seed_key: String,
    /// Half-width of the multiplicative jitter (0.03 = ±3%).
    pub variance: f64,
    /// Scoring-pace multiplier from team power; 1.0 is neutral.
    pub pace_multiplier: f64,
}

impl TotalContext {
    pub fn new(seed_key: impl Into<String>) -> Self {
        TotalContext {
            week_number: None,
            seed_key: seed_key.into(),
            variance: DEFAULT_TOTAL_VARIANCE,
            pace_multiplier: 1.0,
        }
    }
}

/// Pace multiplier from two power scores: ±5% across the full 0-100 range.
pub fn pace_multiplier(power1: &PowerResult, power2: &PowerResult) -> f64 {
    let mean_power = (power1.power_score + power2.power_score) / 2.0;
    1.0 + (mean_power - 50.0) / 1000.0
}

/// Over/under line for a matchup, clamped to `[180, 320]` and rounded to the half point.
pub fn calculate_total(team1_avg: f64, team2_avg: f64, context: &TotalContext) -> f64 {
    let mut total = team1_avg + team2_avg;
    if !total.is_finite() || total < MIN_PLAUSIBLE_TOTAL {
        total = DEFAULT_TOTAL;
    }

    if context.pace_multiplier.is_finite() && context.pace_multiplier > 0.0 {
        total *= context.pace_multiplier;
    }

    if context
        .week_number
        .is_some_and(|week| week <= EARLY_SEASON_LAST_WEEK)
    {
        total *= EARLY_SEASON_INFLATION;
    }

    let variance = if context.variance.is_finite() {
        context.variance.clamp(0.0, MAX_TOTAL_VARIANCE)
    } else {
        DEFAULT_TOTAL_VARIANCE
    };
    let mut rng = SeededRandom::from_seed(&context.seed_key);
    total *= 1.0 + rng.symmetric(variance);

    round_to_half(total.clamp(MIN_TOTAL, MAX_TOTAL))
}
