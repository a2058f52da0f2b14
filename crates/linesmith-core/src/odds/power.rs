// Team power model: a 0-100 strength score from scoring, consistency and momentum.

use serde::Serialize;

use crate::league::season::{SeasonStatsMap, TeamSeasonStats};
use crate::stats::{compute_moments, mean};

// ---------------------------------------------------------------------------
// Weights and scales
// ---------------------------------------------------------------------------

const NEUTRAL_POWER: f64 = 50.0;

const POINTS_WEIGHT: f64 = 60.0;
const CONSISTENCY_WEIGHT: f64 = 25.0;
const MOMENTUM_WEIGHT: f64 = 15.0;

/// Relative scoring edge is multiplied by this before the tanh squash, so a
/// team 10% above league average lands near half the points weight.
const POINTS_SCALE: f64 = 5.0;

/// Coefficient of variation treated as "ordinary" week-to-week noise.
const REFERENCE_CV: f64 = 0.3;

const MOMENTUM_SCALE: f64 = 5.0;
const MOMENTUM_WINDOW: usize = 3;

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Power score and the three components that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerResult {
    /// `50 + components`, clamped to `[0, 100]`.
    pub power_score: f64,
    /// Scoring edge over the league, within `±60`.
    pub points_component: f64,
    /// Low week-to-week variability, within `±25`.
    pub consistency_component: f64,
    /// Recent games against earlier games, within `±15`.
    pub momentum_component: f64,
}

impl PowerResult {
    pub fn neutral() -> Self {
        PowerResult {
            power_score: NEUTRAL_POWER,
            points_component: 0.0,
            consistency_component: 0.0,
            momentum_component: 0.0,
        }
    }

    /// Consistency mapped onto `[0, 1]`; 0.5 when there is no history.
    pub fn consistency_rating(&self) -> f64 {
        ((self.consistency_component / CONSISTENCY_WEIGHT + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Momentum mapped onto `[-1, 1]`.
    pub fn momentum_rating(&self) -> f64 {
        (self.momentum_component / MOMENTUM_WEIGHT).clamp(-1.0, 1.0)
    }
}

impl Default for PowerResult {
    fn default() -> Self {
        Self::neutral()
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Mean of every team's average score, counting only teams that have played.
pub fn league_average_score(all_stats: &SeasonStatsMap) -> Option<f64> {
    let averages: Vec<f64> = all_stats
        .values()
        .filter(|s| s.games_played > 0 && s.average_score.is_finite())
        .map(|s| s.average_score)
        .collect();
    mean(&averages).filter(|m| *m > 0.0)
}

fn points_component(average_score: f64, league_average: Option<f64>) -> f64 {
    let Some(league) = league_average else {
        return 0.0;
    };
    let relative = (average_score - league) / league;
    finite_or_zero((relative * POINTS_SCALE).tanh() * POINTS_WEIGHT)
}

fn consistency_component(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let Some(cv) = compute_moments(scores).coefficient_of_variation() else {
        return 0.0;
    };
    let edge = ((REFERENCE_CV - cv) / REFERENCE_CV).clamp(-1.0, 1.0);
    finite_or_zero(edge * CONSISTENCY_WEIGHT)
}

fn momentum_component(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let window = MOMENTUM_WINDOW.min(scores.len());
    let (early, recent) = scores.split_at(scores.len() - window);
    let (Some(early_mean), Some(recent_mean)) = (mean(early), mean(recent)) else {
        return 0.0;
    };
    if early_mean <= 0.0 {
        return 0.0;
    }
    let trend = (recent_mean - early_mean) / early_mean;
    finite_or_zero((trend * MOMENTUM_SCALE).tanh() * MOMENTUM_WEIGHT)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Power score for one team, normalized against the whole league.
///
/// Missing stats produce the neutral result (`50`, all components zero).
pub fn calculate_advanced_team_power(
    stats: Option<&TeamSeasonStats>,
    all_stats: &SeasonStatsMap,
) -> PowerResult {
    let Some(stats) = stats else {
        return PowerResult::neutral();
    };

    let points = points_component(stats.average_score, league_average_score(all_stats));
    let consistency = consistency_component(&stats.scores);
    let momentum = momentum_component(&stats.scores);

    PowerResult {
        power_score: (NEUTRAL_POWER + points + consistency + momentum).clamp(0.0, 100.0),
        points_component: points,
        consistency_component: consistency,
        momentum_component: momentum,
    }
}

/// Power differential in tens of power points (`+1.0` = team1 ten points stronger).
pub fn power_differential(team1: &PowerResult, team2: &PowerResult) -> f64 {
    (team1.power_score - team2.power_score) / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u32, scores: &[f64]) -> TeamSeasonStats {
        TeamSeasonStats::from_scores(id, format!("Team {id}"), scores.to_vec())
    }

    fn league(teams: &[TeamSeasonStats]) -> SeasonStatsMap {
        teams
            .iter()
            .map(|t| (t.roster_id.unwrap(), t.clone()))
            .collect()
    }

    #[test]
    fn missing_stats_are_neutral() {
        let result = calculate_advanced_team_power(None, &SeasonStatsMap::new());
        assert_eq!(result, PowerResult::neutral());
        assert!((result.consistency_rating() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn league_average_team_with_flat_scores() {
        let a = team(1, &[120.0, 120.0, 120.0, 120.0]);
        let b = team(2, &[120.0, 120.0, 120.0, 120.0]);
        let all = league(&[a.clone(), b]);
        let result = calculate_advanced_team_power(Some(&a), &all);
        assert!(result.points_component.abs() < 1e-9);
        // Zero variability earns the full consistency weight.
        assert!((result.consistency_component - 25.0).abs() < 1e-9);
        assert!(result.momentum_component.abs() < 1e-9);
        assert!((result.power_score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn points_component_is_saturating_and_signed() {
        let strong = team(1, &[200.0, 200.0]);
        let weak = team(2, &[60.0, 60.0]);
        let all = league(&[strong.clone(), weak.clone()]);
        let s = calculate_advanced_team_power(Some(&strong), &all);
        let w = calculate_advanced_team_power(Some(&weak), &all);
        assert!(s.points_component > 55.0 && s.points_component <= 60.0);
        assert!(w.points_component < -55.0 && w.points_component >= -60.0);
        assert!(s.power_score <= 100.0);
        assert!(w.power_score >= 0.0);
    }

    #[test]
    fn consistency_needs_two_games() {
        let single = team(1, &[150.0]);
        let all = league(&[single.clone()]);
        let result = calculate_advanced_team_power(Some(&single), &all);
        assert_eq!(result.consistency_component, 0.0);
        assert_eq!(result.momentum_component, 0.0);
    }

    #[test]
    fn volatile_team_scores_below_steady_team() {
        let steady = team(1, &[118.0, 122.0, 119.0, 121.0]);
        let wild = team(2, &[60.0, 180.0, 70.0, 170.0]);
        let all = league(&[steady.clone(), wild.clone()]);
        let s = calculate_advanced_team_power(Some(&steady), &all);
        let w = calculate_advanced_team_power(Some(&wild), &all);
        assert!(s.consistency_component > w.consistency_component);
        assert!(s.consistency_rating() > w.consistency_rating());
    }

    #[test]
    fn momentum_needs_an_early_game() {
        // Three games all fall in the recent window.
        let short = team(1, &[100.0, 120.0, 140.0]);
        let all = league(&[short.clone()]);
        assert_eq!(
            calculate_advanced_team_power(Some(&short), &all).momentum_component,
            0.0
        );
    }

    #[test]
    fn rising_team_has_positive_momentum() {
        let rising = team(1, &[90.0, 95.0, 130.0, 140.0, 135.0]);
        let falling = team(2, &[140.0, 135.0, 95.0, 90.0, 100.0]);
        let all = league(&[rising.clone(), falling.clone()]);
        let r = calculate_advanced_team_power(Some(&rising), &all);
        let f = calculate_advanced_team_power(Some(&falling), &all);
        assert!(r.momentum_component > 0.0 && r.momentum_component <= 15.0);
        assert!(f.momentum_component < 0.0 && f.momentum_component >= -15.0);
        assert!(r.momentum_rating() > 0.0);
    }

    #[test]
    fn power_differential_is_in_tens() {
        let a = PowerResult {
            power_score: 80.0,
            ..PowerResult::neutral()
        };
        let b = PowerResult {
            power_score: 45.0,
            ..PowerResult::neutral()
        };
        assert!((power_differential(&a, &b) - 3.5).abs() < 1e-12);
        assert!((power_differential(&b, &a) + 3.5).abs() < 1e-12);
    }

    #[test]
    fn league_average_ignores_teams_without_games() {
        let played = team(1, &[140.0, 100.0]);
        let empty = TeamSeasonStats::placeholder(Some(2), "Empty");
        let all = league(&[played, empty]);
        assert_eq!(league_average_score(&all), Some(120.0));
    }
}
