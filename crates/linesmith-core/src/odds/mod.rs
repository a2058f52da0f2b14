// Odds engine: season stats for two teams in, a full sportsbook market out.

pub mod juice;
pub mod markets;
pub mod moneyline;
pub mod normal;
pub mod power;
pub mod props;
pub mod rng;
pub mod spread;
pub mod total;
pub mod variance;
pub mod win_prob;

pub use markets::{
    generate_clean_betting_markets, resolve_team_stats, BettingMarkets, MarketOptions, Matchup,
    TeamLookup, TeamRef,
};
pub use power::{calculate_advanced_team_power, PowerResult};
pub use rng::seeded_random_from_string;
pub use spread::calculate_spread_from_probability;
pub use moneyline::convert_spread_to_moneyline;
pub use total::{calculate_total, TotalContext};
