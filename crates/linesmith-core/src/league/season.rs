// Season-stats aggregation.
//
// Rebuilds every team's season line from raw weekly results each time it is
// requested. Nothing here is cached: the output is a pure function of the
// results slice and the cut-off week.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::league::results::WeeklyResult;
use crate::league::RosterId;
use crate::stats::{compute_moments, mean};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Average score assumed for a team the engine knows nothing about.
pub const DEFAULT_AVERAGE_SCORE: f64 = 120.0;

/// Number of trailing games compared against the season average for hot/cold.
const STREAK_WINDOW: usize = 3;

/// Recent mean must sit this many standard deviations from the season mean.
const STREAK_THRESHOLD_SD: f64 = 0.5;

/// One team's season to date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSeasonStats {
    pub roster_id: Option<RosterId>,
    pub owner_id: Option<String>,
    pub name: String,
    /// Mean points per played game (also called points-per-game).
    pub average_score: f64,
    /// Chronological per-game point totals.
    pub scores: Vec<f64>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub games_played: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub high_score: Option<f64>,
    pub low_score: Option<f64>,
    /// League-normalized power rating; 1.0 is league average.
    pub dpr: Option<f64>,
    pub is_hot: bool,
    pub is_cold: bool,
}

impl TeamSeasonStats {
    /// Stand-in line for a team with no usable history.
    pub fn placeholder(roster_id: Option<RosterId>, name: impl Into<String>) -> Self {
        TeamSeasonStats {
            roster_id,
            owner_id: None,
            name: name.into(),
            average_score: DEFAULT_AVERAGE_SCORE,
            scores: Vec::new(),
            wins: 0,
            losses: 0,
            ties: 0,
            games_played: 0,
            points_for: 0.0,
            points_against: 0.0,
            high_score: None,
            low_score: None,
            dpr: None,
            is_hot: false,
            is_cold: false,
        }
    }

    /// Build a line from a raw score list, with no opponent information.
    ///
    /// Record counters stay at zero; streak flags are derived from the scores.
    pub fn from_scores(roster_id: RosterId, name: impl Into<String>, scores: Vec<f64>) -> Self {
        let mut stats = Self::placeholder(Some(roster_id), name);
        stats.games_played = scores.len() as u32;
        if let Some(avg) = mean(&scores) {
            stats.average_score = avg;
        }
        stats.points_for = scores.iter().sum();
        stats.high_score = scores.iter().copied().reduce(f64::max);
        stats.low_score = scores.iter().copied().reduce(f64::min);
        let (hot, cold) = streak_flags(&scores);
        stats.is_hot = hot;
        stats.is_cold = cold;
        stats.scores = scores;
        stats
    }

    /// Win fraction with ties counted as half; 0.5 before any game.
    pub fn win_pct(&self) -> f64 {
        let decided = self.wins + self.losses + self.ties;
        if decided == 0 {
            return 0.5;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / decided as f64
    }

    /// Display record, e.g. `4-1` or `3-1-1`.
    pub fn record(&self) -> String {
        if self.ties > 0 {
            format!("{}-{}-{}", self.wins, self.losses, self.ties)
        } else {
            format!("{}-{}", self.wins, self.losses)
        }
    }
}

/// Season stats for a whole league, ordered by roster id.
pub type SeasonStatsMap = BTreeMap<RosterId, TeamSeasonStats>;

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Hot/cold flags: the last [`STREAK_WINDOW`] games against the season average.
pub fn streak_flags(scores: &[f64]) -> (bool, bool) {
    if scores.len() < STREAK_WINDOW {
        return (false, false);
    }
    let moments = compute_moments(scores);
    if moments.stdev <= 0.0 {
        return (false, false);
    }
    let recent = &scores[scores.len() - STREAK_WINDOW..];
    let Some(recent_mean) = mean(recent) else {
        return (false, false);
    };
    let deviation = (recent_mean - moments.mean) / moments.stdev;
    (
        deviation > STREAK_THRESHOLD_SD,
        deviation < -STREAK_THRESHOLD_SD,
    )
}

/// Un-normalized power rating: `((avg*6) + ((high+low)*2) + ((win%*200)*2)) / 10`.
fn raw_power_rating(stats: &TeamSeasonStats) -> Option<f64> {
    let (Some(high), Some(low)) = (stats.high_score, stats.low_score) else {
        return None;
    };
    Some(
        ((stats.average_score * 6.0) + ((high + low) * 2.0) + ((stats.win_pct() * 200.0) * 2.0))
            / 10.0,
    )
}

/// Aggregate all games played before `through_week` into per-team season stats.
///
/// A game counts as played when both sides have points and at least one side
/// scored. Teams seen only in unplayed rows get a zero-game entry.
pub fn build_season_stats(results: &[WeeklyResult], through_week: u32) -> SeasonStatsMap {
    let mut map = SeasonStatsMap::new();

    // Register every team so upcoming opponents resolve even with no history.
    for row in results {
        let entry = map
            .entry(row.roster_id)
            .or_insert_with(|| TeamSeasonStats::placeholder(Some(row.roster_id), &row.team_name));
        // Last row wins for the display name.
        entry.name = row.team_name.clone();
        if row.owner_id.is_some() {
            entry.owner_id = row.owner_id.clone();
        }
    }

    // Pair rows by (week, matchup_id).
    let mut games: BTreeMap<(u32, u32), Vec<&WeeklyResult>> = BTreeMap::new();
    for row in results.iter().filter(|r| r.week < through_week) {
        games.entry((row.week, row.matchup_id)).or_default().push(row);
    }

    let mut scores: HashMap<RosterId, Vec<(u32, f64)>> = HashMap::new();
    for ((week, matchup_id), rows) in &games {
        let [a, b] = rows.as_slice() else {
            debug!(
                "week {} matchup {} has {} rows, skipping",
                week,
                matchup_id,
                rows.len()
            );
            continue;
        };
        let (Some(pa), Some(pb)) = (a.points, b.points) else {
            continue;
        };
        if pa == 0.0 && pb == 0.0 {
            continue;
        }
        for (me, my_pts, their_pts) in [(a, pa, pb), (b, pb, pa)] {
            let Some(stats) = map.get_mut(&me.roster_id) else {
                continue;
            };
            stats.points_against += their_pts;
            if my_pts > their_pts {
                stats.wins += 1;
            } else if my_pts < their_pts {
                stats.losses += 1;
            } else {
                stats.ties += 1;
            }
            scores.entry(me.roster_id).or_default().push((*week, my_pts));
        }
    }

    for (roster_id, mut weekly) in scores {
        let Some(stats) = map.get_mut(&roster_id) else {
            continue;
        };
        weekly.sort_by_key(|(week, _)| *week);
        let season: Vec<f64> = weekly.into_iter().map(|(_, pts)| pts).collect();
        stats.games_played = season.len() as u32;
        stats.points_for = season.iter().sum();
        if let Some(avg) = mean(&season) {
            stats.average_score = avg;
        }
        stats.high_score = season.iter().copied().reduce(f64::max);
        stats.low_score = season.iter().copied().reduce(f64::min);
        let (hot, cold) = streak_flags(&season);
        stats.is_hot = hot;
        stats.is_cold = cold;
        stats.scores = season;
    }

    // Normalize power ratings against the league mean.
    let raw: Vec<(RosterId, f64)> = map
        .iter()
        .filter_map(|(id, s)| raw_power_rating(s).map(|r| (*id, r)))
        .collect();
    let raw_values: Vec<f64> = raw.iter().map(|(_, r)| *r).collect();
    if let Some(league_raw) = mean(&raw_values).filter(|m| *m > 0.0) {
        for (id, r) in raw {
            if let Some(stats) = map.get_mut(&id) {
                stats.dpr = Some(r / league_raw);
            }
        }
    }

    map
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
