// Point-spread computation.
//
// Two strategies produce a team1 line (negative = team1 favored):
//
// - `HistoricalSpread` works from the per-game score history of two teams
//   resolved by roster id and layers form/trend/streak adjustments on top of
//   the scoring gap.
// - `DistributionSpread` models the margin as a normal distribution and reads
//   the line off the inverse CDF at the matchup's win probability.
//
// `select_spread` prefers the historical result when it is backed by real
// games, falls back to the distribution model, and finally to the plain
// probability-to-spread curve if the numeric path degenerates.

use serde::Serialize;
use tracing::{debug, warn};

use crate::league::season::TeamSeasonStats;
use crate::odds::normal::inv_normal_cdf;
use crate::odds::power::PowerResult;
use crate::odds::variance::score_variance;
use crate::stats::{mean, round_to_half};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where a spread came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpreadBasis {
    /// Historical path with at least four games per team.
    Enhanced,
    /// Historical path with two or three games per team.
    DynamicStats,
    /// Normal margin model.
    Distribution,
    /// Probability curve fallback.
    Probability,
}

impl SpreadBasis {
    /// True when the line is backed by real per-game history.
    pub fn is_historical(&self) -> bool {
        matches!(self, SpreadBasis::Enhanced | SpreadBasis::DynamicStats)
    }
}

/// A finished team1 line: rounded to the half point, `0.0` for pick'em.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadEstimate {
    pub spread: f64,
    pub basis: SpreadBasis,
    pub confidence: f64,
}

/// Everything a strategy may look at for one matchup.
#[derive(Debug, Clone, Copy)]
pub struct SpreadInput<'a> {
    pub team1: &'a TeamSeasonStats,
    pub team2: &'a TeamSeasonStats,
    pub power1: &'a PowerResult,
    pub power2: &'a PowerResult,
    /// Probability that team1 wins, already reconciled and nudged.
    pub win_probability: f64,
    /// Power differential in tens of power points.
    pub power_diff: f64,
    /// Both teams were found by roster id in the season stats.
    pub roster_keyed: bool,
}

impl SpreadInput<'_> {
    fn scoring_gap(&self) -> f64 {
        self.team1.average_score - self.team2.average_score
    }
}

/// One way of turning a matchup into a spread.
pub trait SpreadStrategy {
    fn name(&self) -> &'static str;

    /// `None` when the strategy cannot price this matchup.
    fn estimate(&self, input: &SpreadInput<'_>) -> Option<SpreadEstimate>;
}

// ---------------------------------------------------------------------------
// Shared finishing rule
// ---------------------------------------------------------------------------

/// Below this scoring gap (points) a sub-half-point line may become a pick'em.
const PICK_MAX_SCORING_GAP: f64 = 5.0;
/// Below this power differential a sub-half-point line may become a pick'em.
const PICK_MAX_POWER_DIFF: f64 = 1.0;

/// Round a raw team1 line to the half point and apply the pick'em rule.
///
/// A line under half a point is a pick'em (`0.0`). When the teams are not
/// close on scoring or power the rounded value is still trusted as is.
/// There is no upper cap.
pub fn finalize_spread(raw_line: f64, scoring_gap: f64, power_diff: f64) -> f64 {
    let magnitude = round_to_half(raw_line.abs());
    if magnitude < 0.5 {
        let close = scoring_gap.abs() < PICK_MAX_SCORING_GAP
            && power_diff.abs() < PICK_MAX_POWER_DIFF;
        if !close {
            debug!(
                "line {:.2} rounds to a pick'em despite gap {:.2} / power diff {:.2}",
                raw_line, scoring_gap, power_diff
            );
        }
        return 0.0;
    }
    let team1_favored = if raw_line != 0.0 {
        raw_line < 0.0
    } else {
        scoring_gap > 0.0
    };
    if team1_favored {
        -magnitude
    } else {
        magnitude
    }
}

// ---------------------------------------------------------------------------
// Probability curve (baseline)
// ---------------------------------------------------------------------------

/// Map a win probability onto a spread along a sportsbook-shaped curve.
///
/// Distance from a coin flip `d = |p - 0.5|`:
/// up to 0.05 grows to 3 points, 0.05-0.15 to 7, 0.15-0.30 to 14, then keeps
/// opening at 5 points per 0.1. Team1 favored gives a negative line. The
/// power differential shades the result by `-0.2` points per unit.
pub fn calculate_spread_from_probability(win_probability: f64, power_diff: f64) -> f64 {
    let p = if win_probability.is_finite() {
        win_probability.clamp(0.0, 1.0)
    } else {
        0.5
    };
    let d = (p - 0.5).abs();
    let magnitude = if d <= 0.05 {
        d / 0.05 * 3.0
    } else if d <= 0.15 {
        3.0 + (d - 0.05) / 0.10 * 4.0
    } else if d <= 0.30 {
        7.0 + (d - 0.15) / 0.15 * 7.0
    } else {
        14.0 + (d - 0.30) / 0.20 * 10.0
    };
    let signed = if p > 0.5 { -magnitude } else { magnitude };
    let shade = if power_diff.is_finite() {
        power_diff * 0.2
    } else {
        0.0
    };
    let rounded = round_to_half(signed - shade);
    // Normalize -0.0.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// ---------------------------------------------------------------------------
// Distribution strategy
// ---------------------------------------------------------------------------

const RAW_MARGIN_WEIGHT: f64 = 0.65;
const POWER_MARGIN_WEIGHT: f64 = 0.30;
const MOMENTUM_MARGIN_WEIGHT: f64 = 0.05;
/// Points of margin per unit of power differential.
const POWER_MARGIN_POINTS: f64 = 2.5;
const MAX_MODEL_MARGIN: f64 = 20.0;
const MAX_CONSISTENCY_SIGMA_CUT: f64 = 0.30;
const SHARED_MOMENTUM_SIGMA_FACTOR: f64 = 0.95;
const MIN_SIGMA: f64 = 6.0;

/// Normal margin model with power, momentum and consistency blended in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionSpread;

impl DistributionSpread {
    /// Model mean margin (team1 minus team2), clamped to `±20`.
    pub fn model_margin(input: &SpreadInput<'_>) -> f64 {
        let raw_mu = input.scoring_gap();
        let power_margin = input.power_diff * POWER_MARGIN_POINTS;
        let momentum_boost =
            input.power1.momentum_component - input.power2.momentum_component;
        (RAW_MARGIN_WEIGHT * raw_mu
            + POWER_MARGIN_WEIGHT * power_margin
            + MOMENTUM_MARGIN_WEIGHT * momentum_boost)
            .clamp(-MAX_MODEL_MARGIN, MAX_MODEL_MARGIN)
    }

    /// Margin standard deviation after the consistency and momentum cuts.
    pub fn model_sigma(input: &SpreadInput<'_>) -> f64 {
        let base_sigma = (score_variance(input.team1) + score_variance(input.team2)).sqrt();
        let avg_consistency = ((input.power1.consistency_rating()
            + input.power2.consistency_rating())
            / 2.0)
            .clamp(0.0, 1.0);
        let mut sigma = base_sigma * (1.0 - avg_consistency * MAX_CONSISTENCY_SIGMA_CUT);
        if input.power1.momentum_component > 0.0 && input.power2.momentum_component > 0.0 {
            sigma *= SHARED_MOMENTUM_SIGMA_FACTOR;
        }
        sigma.max(MIN_SIGMA)
    }
}

impl SpreadStrategy for DistributionSpread {
    fn name(&self) -> &'static str {
        "distribution"
    }

    fn estimate(&self, input: &SpreadInput<'_>) -> Option<SpreadEstimate> {
        let p = input.win_probability;
        let mu = Self::model_margin(input);
        let sigma = Self::model_sigma(input);

        let z = inv_normal_cdf(1.0 - p)?;
        let spread_raw = mu + sigma * z;
        if !spread_raw.is_finite() {
            return None;
        }

        let team1_favored = p > 0.5 || (p == 0.5 && mu > 0.0);
        let raw_line = if team1_favored {
            -spread_raw.abs()
        } else {
            spread_raw.abs()
        };
        debug!(
            "distribution spread: mu={:.2} sigma={:.2} z={:.3} raw={:.2}",
            mu, sigma, z, raw_line
        );

        let games = input.team1.scores.len().min(input.team2.scores.len()).min(8);
        Some(SpreadEstimate {
            spread: finalize_spread(raw_line, input.scoring_gap(), input.power_diff),
            basis: SpreadBasis::Distribution,
            confidence: 0.5 + 0.3 * games as f64 / 8.0,
        })
    }
}

// ---------------------------------------------------------------------------
// Historical strategy
// ---------------------------------------------------------------------------

/// Combined standard deviation at which the scoring gap is taken at face value.
const REFERENCE_COMBINED_SD: f64 = 25.0;
const MIN_VARIANCE_DAMPING: f64 = 0.6;
const CONSISTENCY_EDGE_POINTS: f64 = 3.0;
const RECENT_FORM_WEIGHT: f64 = 0.25;
const TREND_WEIGHT: f64 = 0.1;
/// Hot/cold swing per team; a hot team against a cold one moves 5 points.
const STREAK_POINTS: f64 = 2.5;
/// Points of margin removed per point of combined SD above the reference.
const UNCERTAINTY_PENALTY: f64 = 0.1;
const ENHANCED_MIN_GAMES: usize = 4;
const DYNAMIC_MIN_GAMES: usize = 2;

/// Score-history model for teams with real games on record.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalSpread;

/// Last quarter of the season (at least one game) against the season mean.
fn recent_form(stats: &TeamSeasonStats) -> f64 {
    let n = stats.scores.len();
    if n == 0 {
        return 0.0;
    }
    let window = n.div_ceil(4).max(1);
    mean(&stats.scores[n - window..])
        .map(|recent| recent - stats.average_score)
        .unwrap_or(0.0)
}

/// Second-half mean minus first-half mean; needs four games.
fn scoring_trend(stats: &TeamSeasonStats) -> f64 {
    let n = stats.scores.len();
    if n < 4 {
        return 0.0;
    }
    let (early, late) = stats.scores.split_at(n / 2);
    match (mean(early), mean(late)) {
        (Some(e), Some(l)) => l - e,
        _ => 0.0,
    }
}

fn streak_points(stats: &TeamSeasonStats) -> f64 {
    match (stats.is_hot, stats.is_cold) {
        (true, false) => STREAK_POINTS,
        (false, true) => -STREAK_POINTS,
        _ => 0.0,
    }
}

fn historical_confidence(games: usize, abs_spread: f64) -> f64 {
    let mut confidence: f64 = 0.7;
    if games >= 8 {
        confidence += 0.2;
    } else if games >= 4 {
        confidence += 0.1;
    }
    if abs_spread > 20.0 {
        confidence -= 0.3;
    } else if abs_spread > 12.0 {
        confidence -= 0.2;
    } else if abs_spread > 6.0 {
        confidence -= 0.1;
    }
    confidence.clamp(0.1, 0.95)
}

impl SpreadStrategy for HistoricalSpread {
    fn name(&self) -> &'static str {
        "historical"
    }

    fn estimate(&self, input: &SpreadInput<'_>) -> Option<SpreadEstimate> {
        if !input.roster_keyed {
            return None;
        }
        let games = input.team1.scores.len().min(input.team2.scores.len());
        let basis = if games >= ENHANCED_MIN_GAMES {
            SpreadBasis::Enhanced
        } else if games >= DYNAMIC_MIN_GAMES {
            SpreadBasis::DynamicStats
        } else {
            return None;
        };

        let combined_sd = (score_variance(input.team1) + score_variance(input.team2)).sqrt();
        let damping = (REFERENCE_COMBINED_SD / combined_sd).clamp(MIN_VARIANCE_DAMPING, 1.0);
        let base = input.scoring_gap() * damping;

        let consistency = (input.power1.consistency_rating() - input.power2.consistency_rating())
            * CONSISTENCY_EDGE_POINTS;
        let form = (recent_form(input.team1) - recent_form(input.team2)) * RECENT_FORM_WEIGHT;
        let trend = (scoring_trend(input.team1) - scoring_trend(input.team2)) * TREND_WEIGHT;
        let streak = streak_points(input.team1) - streak_points(input.team2);

        let margin = base + consistency + form + trend + streak;
        let penalty = (combined_sd - REFERENCE_COMBINED_SD).max(0.0) * UNCERTAINTY_PENALTY;
        let margin = margin.signum() * (margin.abs() - penalty).max(0.0);
        if !margin.is_finite() {
            return None;
        }
        debug!(
            "historical spread: base={:.2} consistency={:.2} form={:.2} trend={:.2} streak={:.2} penalty={:.2}",
            base, consistency, form, trend, streak, penalty
        );

        // Favorite convention: a positive team1 margin is a negative team1 line.
        let spread = finalize_spread(-margin, input.scoring_gap(), input.power_diff);
        Some(SpreadEstimate {
            spread,
            basis,
            confidence: historical_confidence(games, spread.abs()),
        })
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

const PROBABILITY_FALLBACK_CONFIDENCE: f64 = 0.3;

/// Pick the spread for a matchup.
///
/// Historical estimate when it is backed by real games, else the distribution
/// model, else the probability curve. Never fails.
pub fn select_spread(input: &SpreadInput<'_>) -> SpreadEstimate {
    let historical = HistoricalSpread;
    if let Some(estimate) = historical.estimate(input) {
        if estimate.basis.is_historical() {
            return estimate;
        }
    }

    let distribution = DistributionSpread;
    if let Some(estimate) = distribution.estimate(input) {
        return estimate;
    }

    warn!(
        "{} spread degenerated (p={}), using probability curve",
        distribution.name(),
        input.win_probability
    );
    SpreadEstimate {
        spread: calculate_spread_from_probability(input.win_probability, input.power_diff),
        basis: SpreadBasis::Probability,
        confidence: PROBABILITY_FALLBACK_CONFIDENCE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
