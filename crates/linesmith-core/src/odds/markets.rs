// Market assembly: one matchup in, a complete set of lines out.
//
// Pipeline: resolve both teams -> power -> win probability -> spread ->
// moneylines -> total -> juice -> optional props. Every step degrades to a
// neutral default instead of failing, so a market is always produced.

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::league::season::{SeasonStatsMap, TeamSeasonStats};
use crate::league::RosterId;
use crate::odds::juice::{generate_spread_juice, generate_total_juice};
use crate::odds::moneyline::convert_spread_to_moneyline;
use crate::odds::power::{calculate_advanced_team_power, power_differential, PowerResult};
use crate::odds::props::{generate_prop_bets, PropBets, PropContext};
use crate::odds::spread::{select_spread, DistributionSpread, SpreadBasis, SpreadInput};
use crate::odds::total::{
    calculate_total, pace_multiplier, TotalContext, DEFAULT_TOTAL_VARIANCE,
};
use crate::odds::win_prob::{
    apply_power_nudge, calculate_win_probability, reconcile_win_probability,
};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One side of a matchup as the caller knows it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamRef {
    pub roster_id: Option<RosterId>,
    pub name: Option<String>,
}

impl TeamRef {
    pub fn by_id(roster_id: RosterId) -> Self {
        TeamRef {
            roster_id: Some(roster_id),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        TeamRef {
            roster_id: None,
            name: Some(name.into()),
        }
    }

    /// Stable key for seeding: roster id, else the normalized name.
    fn seed_key(&self) -> String {
        match (&self.roster_id, &self.name) {
            (Some(id), _) => id.to_string(),
            (None, Some(name)) => name.trim().to_lowercase(),
            (None, None) => "unknown".to_string(),
        }
    }
}

/// A head-to-head pairing to price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub team1: TeamRef,
    pub team2: TeamRef,
    /// Team1 win probability from an outside source, if any.
    pub win_probability: Option<f64>,
    pub week: Option<u32>,
}

impl Matchup {
    pub fn new(team1: TeamRef, team2: TeamRef) -> Self {
        Matchup {
            team1,
            team2,
            win_probability: None,
            week: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketOptions {
    pub vig: f64,
    pub include_prop_bets: bool,
    /// Overrides the matchup's own week when set.
    pub week_number: Option<u32>,
    pub total_variance: f64,
}

impl Default for MarketOptions {
    fn default() -> Self {
        MarketOptions {
            vig: 0.045,
            include_prop_bets: false,
            week_number: None,
            total_variance: DEFAULT_TOTAL_VARIANCE,
        }
    }
}

impl MarketOptions {
    pub fn from_config(config: &Config, week: u32) -> Self {
        MarketOptions {
            vig: config.markets.vig,
            include_prop_bets: config.markets.include_prop_bets,
            week_number: Some(week),
            total_variance: config.markets.total_variance,
        }
    }
}

// ---------------------------------------------------------------------------
// Team resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupKey {
    RosterId,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeamLookup<'a> {
    Found {
        stats: &'a TeamSeasonStats,
        via: LookupKey,
    },
    NotFound,
}

impl<'a> TeamLookup<'a> {
    pub fn stats(&self) -> Option<&'a TeamSeasonStats> {
        match self {
            TeamLookup::Found { stats, .. } => Some(stats),
            TeamLookup::NotFound => None,
        }
    }

    pub fn by_roster_id(&self) -> bool {
        matches!(
            self,
            TeamLookup::Found {
                via: LookupKey::RosterId,
                ..
            }
        )
    }
}

/// Find a team's season stats: roster id first, then a case-insensitive
/// exact name match across all entries.
pub fn resolve_team_stats<'a>(team: &TeamRef, all_stats: &'a SeasonStatsMap) -> TeamLookup<'a> {
    if let Some(stats) = team.roster_id.and_then(|id| all_stats.get(&id)) {
        return TeamLookup::Found {
            stats,
            via: LookupKey::RosterId,
        };
    }
    if let Some(wanted) = team.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        if let Some(stats) = all_stats
            .values()
            .find(|s| s.name.trim().eq_ignore_ascii_case(wanted))
        {
            return TeamLookup::Found {
                stats,
                via: LookupKey::Name,
            };
        }
    }
    TeamLookup::NotFound
}

fn display_name(team: &TeamRef, stats: &TeamSeasonStats) -> String {
    if let Some(name) = team.name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    if !stats.name.is_empty() {
        return stats.name.clone();
    }
    match team.roster_id {
        Some(id) => format!("Team {id}"),
        None => "Unknown".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketTeam {
    pub roster_id: Option<RosterId>,
    pub name: String,
    pub record: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadLine {
    /// `"PK"` or a signed number such as `"-3.5"`.
    pub line: String,
    pub points: f64,
    pub odds: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadMarket {
    pub team1: SpreadLine,
    pub team2: SpreadLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoneylineMarket {
    pub team1: i32,
    pub team2: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TotalMarket {
    pub line: f64,
    pub over: i32,
    pub under: i32,
}

/// Diagnostics behind the lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerAnalysis {
    pub team1: PowerResult,
    pub team2: PowerResult,
    pub power_diff: f64,
    /// Team1 probability from the season model, before reconciliation.
    pub model_probability: f64,
    /// Team1 probability actually used for the spread.
    pub win_probability: f64,
    pub spread_basis: SpreadBasis,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BettingMarkets {
    pub week: Option<u32>,
    pub team1: MarketTeam,
    pub team2: MarketTeam,
    pub spread: SpreadMarket,
    pub moneyline: MoneylineMarket,
    pub total: TotalMarket,
    pub is_team1_favorite: bool,
    pub is_pick: bool,
    pub power_analysis: PowerAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<PropBets>,
}

/// Display form of a spread line.
pub fn format_spread_line(points: f64) -> String {
    if points == 0.0 {
        "PK".to_string()
    } else {
        format!("{points:+}")
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn resolved_or_placeholder<'a>(
    team: &TeamRef,
    lookup: &TeamLookup<'a>,
) -> Cow<'a, TeamSeasonStats> {
    match lookup.stats() {
        Some(stats) => Cow::Borrowed(stats),
        None => {
            warn!(
                "no season stats for team {:?} ({:?}), using league defaults",
                team.roster_id, team.name
            );
            let name = team.name.clone().unwrap_or_default();
            Cow::Owned(TeamSeasonStats::placeholder(team.roster_id, name))
        }
    }
}

/// Price one matchup: spread, moneyline, total, juice and optional props.
///
/// Never fails. Teams missing from `all_stats` are priced as league-average
/// placeholders, and any degenerate numeric step falls back to a simpler
/// model. Output is fully determined by the inputs.
pub fn generate_clean_betting_markets(
    matchup: &Matchup,
    all_stats: &SeasonStatsMap,
    options: &MarketOptions,
) -> BettingMarkets {
    let week = options.week_number.or(matchup.week);
    let seed_base = format!(
        "{}-{}-w{}",
        matchup.team1.seed_key(),
        matchup.team2.seed_key(),
        week.unwrap_or(0)
    );

    let lookup1 = resolve_team_stats(&matchup.team1, all_stats);
    let lookup2 = resolve_team_stats(&matchup.team2, all_stats);
    let team1 = resolved_or_placeholder(&matchup.team1, &lookup1);
    let team2 = resolved_or_placeholder(&matchup.team2, &lookup2);

    let power1 = calculate_advanced_team_power(lookup1.stats(), all_stats);
    let power2 = calculate_advanced_team_power(lookup2.stats(), all_stats);
    let power_diff = power_differential(&power1, &power2);

    let model_probability = calculate_win_probability(&team1, &team2);
    let caller_probability = matchup
        .win_probability
        .filter(|p| p.is_finite() && (0.0..=1.0).contains(p));
    let reconciled = if matchup.team1.roster_id.is_some() && matchup.team2.roster_id.is_some() {
        reconcile_win_probability(model_probability, caller_probability)
    } else {
        caller_probability.unwrap_or(model_probability)
    };
    let win_probability = apply_power_nudge(reconciled, power_diff);

    let input = SpreadInput {
        team1: &team1,
        team2: &team2,
        power1: &power1,
        power2: &power2,
        win_probability,
        power_diff,
        roster_keyed: lookup1.by_roster_id() && lookup2.by_roster_id(),
    };
    let estimate = select_spread(&input);
    let spread = estimate.spread;
    let abs_spread = spread.abs();
    let is_pick = abs_spread == 0.0;
    let is_team1_favorite = spread < 0.0;

    debug!(
        "{seed_base}: power {:.1} vs {:.1}, p_model={:.3} p={:.3}, spread {} ({:?})",
        power1.power_score,
        power2.power_score,
        model_probability,
        win_probability,
        spread,
        estimate.basis
    );

    let moneyline = if is_pick {
        let seed1 = format!("{seed_base}-ml-pick-1");
        let seed2 = format!("{seed_base}-ml-pick-2");
        MoneylineMarket {
            team1: convert_spread_to_moneyline(0.0, true, options.vig, &seed1),
            team2: convert_spread_to_moneyline(0.0, false, options.vig, &seed2),
        }
    } else {
        let seed = format!("{seed_base}-ml-line");
        MoneylineMarket {
            team1: convert_spread_to_moneyline(abs_spread, is_team1_favorite, options.vig, &seed),
            team2: convert_spread_to_moneyline(abs_spread, !is_team1_favorite, options.vig, &seed),
        }
    };

    let total_line = calculate_total(
        team1.average_score,
        team2.average_score,
        &TotalContext {
            week_number: week,
            seed_key: format!("{seed_base}-total"),
            variance: options.total_variance,
            pace_multiplier: pace_multiplier(&power1, &power2),
        },
    );

    let spread_juice = generate_spread_juice(abs_spread, &format!("{seed_base}-spread-juice"));
    let (team1_juice, team2_juice) = if is_team1_favorite {
        (spread_juice.favorite, spread_juice.underdog)
    } else {
        (spread_juice.underdog, spread_juice.favorite)
    };
    let total_juice = generate_total_juice(&format!("{seed_base}-total-juice"));

    let team1_points = if is_pick { 0.0 } else { spread };
    let team2_points = if is_pick { 0.0 } else { -spread };

    let props = options.include_prop_bets.then(|| {
        generate_prop_bets(&PropContext {
            team1_average: team1.average_score,
            team2_average: team2.average_score,
            total: total_line,
            spread: team1_points,
            margin_sigma: DistributionSpread::model_sigma(&input),
            vig: options.vig,
            seed_key: &format!("{seed_base}-props"),
        })
    });

    BettingMarkets {
        week,
        team1: MarketTeam {
            roster_id: matchup.team1.roster_id.or(team1.roster_id),
            name: display_name(&matchup.team1, &team1),
            record: team1.record(),
        },
        team2: MarketTeam {
            roster_id: matchup.team2.roster_id.or(team2.roster_id),
            name: display_name(&matchup.team2, &team2),
            record: team2.record(),
        },
        spread: SpreadMarket {
            team1: SpreadLine {
                line: format_spread_line(team1_points),
                points: team1_points,
                odds: team1_juice,
            },
            team2: SpreadLine {
                line: format_spread_line(team2_points),
                points: team2_points,
                odds: team2_juice,
            },
        },
        moneyline,
        total: TotalMarket {
            line: total_line,
            over: total_juice.over,
            under: total_juice.under,
        },
        is_team1_favorite,
        is_pick,
        power_analysis: PowerAnalysis {
            team1: power1,
            team2: power2,
            power_diff,
            model_probability,
            win_probability,
            spread_basis: estimate.basis,
            confidence: estimate.confidence,
        },
        props,
    }
}
