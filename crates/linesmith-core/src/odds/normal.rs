// Normal-distribution helpers built on closed-form error-function approximations.
//
// Accuracy is around 1e-3, which is plenty for display odds.

use std::f64::consts::{PI, SQRT_2};

/// Error function (Abramowitz & Stegun 7.1.26, max error 1.5e-7).
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Inverse error function (Winitzki's approximation, `a = 0.147`).
///
/// Returns `None` outside the open interval `(-1, 1)`.
pub fn erf_inv(x: f64) -> Option<f64> {
    if !x.is_finite() || x <= -1.0 || x >= 1.0 {
        return None;
    }
    const A: f64 = 0.147;
    let ln = (1.0 - x * x).ln();
    let first = 2.0 / (PI * A) + ln / 2.0;
    // Cancellation near x = 0 can leave a tiny negative.
    let inner = ((first * first - ln / A).sqrt() - first).max(0.0);
    let value = inner.sqrt().copysign(x);
    value.is_finite().then_some(value)
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Standard normal quantile; `None` unless `0 < p < 1`.
pub fn inv_normal_cdf(p: f64) -> Option<f64> {
    if !p.is_finite() || p <= 0.0 || p >= 1.0 {
        return None;
    }
    erf_inv(2.0 * p - 1.0).map(|e| SQRT_2 * e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erf_known_values() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
        assert!((erf(3.0) - 0.999_977_91).abs() < 1e-6);
    }

    #[test]
    fn normal_cdf_known_values() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.0) - 0.841_344_75).abs() < 1e-5);
        assert!((normal_cdf(-1.959_964) - 0.025).abs() < 1e-5);
    }

    #[test]
    fn inverse_normal_matches_table_within_tolerance() {
        let cases = [
            (0.5, 0.0),
            (0.841_344_75, 1.0),
            (0.975, 1.959_964),
            (0.1, -1.281_552),
            (0.9, 1.281_552),
            (0.3, -0.524_401),
        ];
        for (p, z) in cases {
            let got = inv_normal_cdf(p).unwrap();
            assert!((got - z).abs() < 5e-3, "p={p}: got {got}, want {z}");
        }
    }

    #[test]
    fn inverse_normal_is_antisymmetric() {
        for p in [0.05, 0.2, 0.35, 0.45] {
            let lo = inv_normal_cdf(p).unwrap();
            let hi = inv_normal_cdf(1.0 - p).unwrap();
            assert!((lo + hi).abs() < 1e-9);
        }
    }

    #[test]
    fn inverse_normal_round_trips_through_cdf() {
        for p in [0.02, 0.15, 0.5, 0.72, 0.97] {
            let z = inv_normal_cdf(p).unwrap();
            assert!((normal_cdf(z) - p).abs() < 2e-3);
        }
    }

    #[test]
    fn degenerate_inputs_return_none() {
        assert!(inv_normal_cdf(0.0).is_none());
        assert!(inv_normal_cdf(1.0).is_none());
        assert!(inv_normal_cdf(-0.2).is_none());
        assert!(inv_normal_cdf(f64::NAN).is_none());
        assert!(erf_inv(1.0).is_none());
        assert!(erf_inv(f64::INFINITY).is_none());
    }
}
