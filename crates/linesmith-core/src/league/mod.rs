// League data: weekly results in, per-team season stats and week matchups out.

pub mod results;
pub mod schedule;
pub mod season;

/// Stable per-league team identifier (the platform's roster id).
pub type RosterId = u32;
