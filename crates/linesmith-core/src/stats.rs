// Small descriptive-statistics helpers shared by the aggregation and odds code.

/// Mean and population standard deviation of a score sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreMoments {
    pub mean: f64,
    pub stdev: f64,
}

impl ScoreMoments {
    /// Population variance (`stdev²`).
    pub fn variance(&self) -> f64 {
        self.stdev * self.stdev
    }

    /// Coefficient of variation, or `None` when the mean is not positive.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.mean > 0.0 {
            Some(self.stdev / self.mean)
        } else {
            None
        }
    }
}

/// Compute mean and standard deviation for a slice of values.
///
/// Returns `ScoreMoments { mean: 0.0, stdev: 0.0 }` for an empty slice.
/// Uses the population standard deviation (N denominator): a team's season
/// is the whole population of its games, not a sample.
pub fn compute_moments(values: &[f64]) -> ScoreMoments {
    if values.is_empty() {
        return ScoreMoments {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    ScoreMoments {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Round to the nearest half point (ties away from zero).
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}
