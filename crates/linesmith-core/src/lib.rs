// Library root: synthetic sportsbook lines for a fantasy football league.
//
// `league` turns weekly results into per-team season stats, `odds` turns a
// pair of teams into a complete betting market.

pub mod config;
pub mod league;
pub mod odds;
pub mod stats;
