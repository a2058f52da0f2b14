// Per-team score variance, from history when there is enough of it.

use crate::league::season::TeamSeasonStats;
use crate::stats::compute_moments;

/// Floor on observed variance (a standard deviation of 10 points).
pub const MIN_OBSERVED_VARIANCE: f64 = 100.0;

/// Proxy coefficient of variation for a team without a usable score history.
///
/// Higher-scoring teams swing a little more in absolute terms.
pub fn proxy_coefficient_of_variation(average_score: f64) -> f64 {
    0.12 + average_score / 1000.0
}

/// Score variance for one team.
///
/// Two or more scores: population variance, floored at [`MIN_OBSERVED_VARIANCE`].
/// Otherwise `(avg * cv)²` with the proxy coefficient of variation.
pub fn score_variance(stats: &TeamSeasonStats) -> f64 {
    if stats.scores.len() >= 2 {
        return compute_moments(&stats.scores)
            .variance()
            .max(MIN_OBSERVED_VARIANCE);
    }
    let avg = stats.average_score;
    (avg * proxy_coefficient_of_variation(avg)).powi(2)
}
