// Matchup win probability from season scoring, record and power rating.

use crate::league::season::TeamSeasonStats;
use crate::odds::normal::normal_cdf;
use crate::odds::variance::score_variance;

const SCORING_WEIGHT: f64 = 0.75;
const RECORD_WEIGHT: f64 = 0.25;
/// Shift per full point of DPR difference.
const DPR_SENSITIVITY: f64 = 0.05;
const DPR_MAX_SHIFT: f64 = 0.05;

const MIN_MODEL_PROBABILITY: f64 = 0.05;
const MAX_MODEL_PROBABILITY: f64 = 0.95;

/// Distance from 0.5 inside which the model is treated as a coin flip.
pub const COIN_FLIP_BAND: f64 = 0.05;
/// Model weight when it has a clear opinion.
const MODEL_WEIGHT: f64 = 0.7;
/// Model weight inside the coin-flip band.
const COIN_FLIP_MODEL_WEIGHT: f64 = 0.5;

/// Shift per unit of power differential (tens of power points).
const POWER_NUDGE: f64 = 0.02;
const MIN_MARKET_PROBABILITY: f64 = 0.1;
const MAX_MARKET_PROBABILITY: f64 = 0.9;

/// Probability that team1 beats team2.
///
/// Scoring model: margin `avg1 - avg2` against the combined score spread,
/// through the normal CDF. Record model: `0.5 + (win%1 - win%2) / 2`. The two
/// are blended 75/25, then nudged by DPR and clamped to `[0.05, 0.95]`.
pub fn calculate_win_probability(team1: &TeamSeasonStats, team2: &TeamSeasonStats) -> f64 {
    let sigma = (score_variance(team1) + score_variance(team2)).sqrt();
    let margin = team1.average_score - team2.average_score;
    let scoring = if sigma > 0.0 {
        normal_cdf(margin / sigma)
    } else {
        0.5
    };

    let record = 0.5 + (team1.win_pct() - team2.win_pct()) / 2.0;

    let mut p = SCORING_WEIGHT * scoring + RECORD_WEIGHT * record;
    if let (Some(d1), Some(d2)) = (team1.dpr, team2.dpr) {
        p += ((d1 - d2) * DPR_SENSITIVITY).clamp(-DPR_MAX_SHIFT, DPR_MAX_SHIFT);
    }

    if !p.is_finite() {
        return 0.5;
    }
    p.clamp(MIN_MODEL_PROBABILITY, MAX_MODEL_PROBABILITY)
}

/// Combine the model probability with one supplied by the caller.
///
/// Near a coin flip (within [`COIN_FLIP_BAND`] of 0.5) the two are averaged;
/// otherwise the model keeps 70% of the weight. This threshold rule is a
/// product heuristic kept for compatibility, not a derived estimator.
pub fn reconcile_win_probability(computed: f64, caller: Option<f64>) -> f64 {
    let Some(caller) = caller.filter(|p| p.is_finite() && (0.0..=1.0).contains(p)) else {
        return computed;
    };
    let weight = if (computed - 0.5).abs() <= COIN_FLIP_BAND {
        COIN_FLIP_MODEL_WEIGHT
    } else {
        MODEL_WEIGHT
    };
    weight * computed + (1.0 - weight) * caller
}

/// Final market probability: power nudge, clamped to `[0.1, 0.9]`.
pub fn apply_power_nudge(probability: f64, power_diff: f64) -> f64 {
    let nudged = probability + power_diff * POWER_NUDGE;
    if !nudged.is_finite() {
        return 0.5;
    }
    nudged.clamp(MIN_MARKET_PROBABILITY, MAX_MARKET_PROBABILITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u32, scores: &[f64]) -> TeamSeasonStats {
        TeamSeasonStats::from_scores(id, format!("Team {id}"), scores.to_vec())
    }

    #[test]
    fn identical_teams_are_even() {
        let a = team(1, &[110.0, 130.0, 120.0]);
        let b = team(2, &[110.0, 130.0, 120.0]);
        assert!((calculate_win_probability(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn better_scorer_is_favored_and_symmetric() {
        let a = team(1, &[140.0, 150.0, 145.0]);
        let b = team(2, &[110.0, 100.0, 120.0]);
        let p_ab = calculate_win_probability(&a, &b);
        let p_ba = calculate_win_probability(&b, &a);
        assert!(p_ab > 0.7);
        assert!((p_ab + p_ba - 1.0).abs() < 1e-9);
    }

    #[test]
    fn record_moves_probability() {
        let mut a = team(1, &[120.0, 120.0]);
        let b = team(2, &[120.0, 120.0]);
        a.wins = 2;
        let p = calculate_win_probability(&a, &b);
        // Record model: 0.5 + (1.0 - 0.5) / 2 = 0.75, weighted 25%.
        assert!((p - (0.75 * 0.5 + 0.25 * 0.75)).abs() < 1e-9);
    }

    #[test]
    fn probability_is_clamped() {
        let a = team(1, &[250.0, 250.0, 251.0]);
        let b = team(2, &[40.0, 41.0, 40.0]);
        let p = calculate_win_probability(&a, &b);
        assert!(p <= 0.95);
    }

    #[test]
    fn reconcile_without_caller_keeps_model() {
        assert_eq!(reconcile_win_probability(0.64, None), 0.64);
        assert_eq!(reconcile_win_probability(0.64, Some(f64::NAN)), 0.64);
        assert_eq!(reconcile_win_probability(0.64, Some(1.4)), 0.64);
    }

    #[test]
    fn reconcile_near_coin_flip_averages() {
        let p = reconcile_win_probability(0.52, Some(0.70));
        assert!((p - 0.61).abs() < 1e-12);
    }

    #[test]
    fn reconcile_clear_model_keeps_seventy_percent() {
        let p = reconcile_win_probability(0.80, Some(0.40));
        assert!((p - (0.7 * 0.80 + 0.3 * 0.40)).abs() < 1e-12);
    }

    #[test]
    fn power_nudge_is_clamped() {
        assert!((apply_power_nudge(0.6, 1.5) - 0.63).abs() < 1e-12);
        assert_eq!(apply_power_nudge(0.85, 5.0), 0.9);
        assert_eq!(apply_power_nudge(0.15, -5.0), 0.1);
        assert_eq!(apply_power_nudge(f64::NAN, 0.0), 0.5);
    }
}
