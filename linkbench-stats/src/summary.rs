//! Sample Summary
//!
//! Mean and confidence interval over a set of timed samples.
//!
//! The standard deviation is the population form (denominator n, no Bessel
//! correction). Historical result sets were produced with this formula, so
//! it is preserved exactly; switching to the sample form would shift every
//! confidence interval and break comparisons against archived CSVs.

use crate::Z_95;

/// Aggregated timing for one target at one test point, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    /// Sample mean.
    pub mean: f64,
    /// Half-width of the 95% confidence interval.
    pub confidence_interval: f64,
}

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population standard deviation: sqrt of the mean squared deviation from
/// `m`.
pub fn population_std_dev(samples: &[f64], m: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_square_diff = samples
        .iter()
        .map(|value| {
            let diff = value - m;
            diff * diff
        })
        .sum::<f64>()
        / samples.len() as f64;
    mean_square_diff.sqrt()
}

/// 95% confidence interval half-width: `1.96 * (std_dev / sqrt(n))`.
pub fn confidence_interval(samples: &[f64], m: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    Z_95 * (population_std_dev(samples, m) / (samples.len() as f64).sqrt())
}

/// Reduce samples to their [`RunStats`].
pub fn summarize(samples: &[f64]) -> RunStats {
    let m = mean(samples);
    RunStats {
        mean: m,
        confidence_interval: confidence_interval(samples, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_samples() {
        assert_eq!(mean(&[10.0, 12.0, 14.0]), 12.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn population_std_dev_uses_denominator_n() {
        // Deviations 2, 0, 2 -> sqrt(8/3).
        let samples = [10.0, 12.0, 14.0];
        let expected = (8.0f64 / 3.0).sqrt();
        assert!((population_std_dev(&samples, 12.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn worked_confidence_interval_example() {
        // mean = 12, population std dev = sqrt(8/3) ~ 1.633,
        // CI = 1.96 * 1.633 / sqrt(3) ~ 1.848.
        let stats = summarize(&[10.0, 12.0, 14.0]);
        assert_eq!(stats.mean, 12.0);
        assert!((stats.confidence_interval - 1.848).abs() < 1e-3);
    }

    #[test]
    fn identical_samples_have_zero_interval() {
        let stats = summarize(&[7.0, 7.0, 7.0, 7.0]);
        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.confidence_interval, 0.0);
    }

    #[test]
    fn single_sample() {
        let stats = summarize(&[42.0]);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.confidence_interval, 0.0);
    }
}
