//! Confidence-interval estimators.
//!
//! Confidence levels are always given two-sided (e.g. `0.99`) and converted
//! with [`one_sided_level`] before the t quantile is taken.

use super::StatsError;
use super::student_t;
use super::summary::SummaryStats;

/// Symmetric interval `mean ± half_width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub half_width: f64,
}

impl ConfidenceInterval {
    pub fn low(&self) -> f64 {
        self.mean - self.half_width
    }

    pub fn high(&self) -> f64 {
        self.mean + self.half_width
    }
}

/// Interval around a geometric mean; the two sides differ in linear space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsymmetricInterval {
    pub mean: f64,
    pub half_width_low: f64,
    pub half_width_high: f64,
}

impl AsymmetricInterval {
    pub fn low(&self) -> f64 {
        self.mean - self.half_width_low
    }

    pub fn high(&self) -> f64 {
        self.mean + self.half_width_high
    }
}

/// Convert a two-sided confidence level to the one-sided quantile level.
pub fn one_sided_level(two_sided: f64) -> f64 {
    two_sided / 2.0 + 0.5
}

fn critical_value(confidence_level: f64, df: usize) -> Result<f64, StatsError> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(StatsError::InvalidConfidenceLevel(confidence_level));
    }
    Ok(student_t::quantile(one_sided_level(confidence_level), df as f64))
}

/// Arithmetic mean with a symmetric t interval.
///
/// Half-width is `t * std / sqrt(n - 1)` with the population `std`, which
/// equals the textbook `t * s / sqrt(n)` written with the sample deviation.
pub fn arithmetic_mean_ci(values: &[f64], confidence_level: f64) -> Result<ConfidenceInterval, StatsError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    let n = values.len();
    if n < 2 {
        return Err(StatsError::TooFewSamples { needed: 2, got: n });
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    mean_ci(n, mean, var.sqrt(), confidence_level)
}

/// Same estimator as [`arithmetic_mean_ci`], fed from a stored summary.
pub fn mean_ci_from_summary(stats: &SummaryStats, confidence_level: f64) -> Result<ConfidenceInterval, StatsError> {
    if stats.count < 2 {
        return Err(StatsError::TooFewSamples {
            needed: 2,
            got: stats.count,
        });
    }
    mean_ci(stats.count, stats.mean, stats.std, confidence_level)
}

fn mean_ci(n: usize, mean: f64, std: f64, confidence_level: f64) -> Result<ConfidenceInterval, StatsError> {
    let t = critical_value(confidence_level, n - 1)?;
    Ok(ConfidenceInterval {
        mean,
        half_width: t * std / ((n - 1) as f64).sqrt(),
    })
}

/// Geometric mean of ratios with an asymmetric interval.
///
/// The arithmetic interval is computed in log space and both bounds are
/// mapped back with `exp`.
pub fn geometric_mean_ci(ratios: &[f64], confidence_level: f64) -> Result<AsymmetricInterval, StatsError> {
    if let Some(bad) = ratios.iter().find(|r| !(**r > 0.0)) {
        return Err(StatsError::NonPositiveRatio(*bad));
    }
    let logs: Vec<f64> = ratios.iter().map(|r| r.ln()).collect();
    let log_ci = arithmetic_mean_ci(&logs, confidence_level)?;

    let mean = log_ci.mean.exp();
    Ok(AsymmetricInterval {
        mean,
        half_width_low: mean - log_ci.low().exp(),
        half_width_high: log_ci.high().exp() - mean,
    })
}

#[derive(Debug, Clone, Copy)]
struct Moments {
    count: usize,
    mean: f64,
    var: f64,
}

impl Moments {
    fn of(values: &[f64]) -> Self {
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count.max(1) as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count.max(1) as f64;
        Self { count, mean, var }
    }
}

impl From<&SummaryStats> for Moments {
    fn from(stats: &SummaryStats) -> Self {
        Self {
            count: stats.count,
            mean: stats.mean,
            var: stats.var,
        }
    }
}

/// Difference `workload - baseline` of two independent duration samples.
///
/// A duration difference cannot be negative: a negative point estimate is
/// clamped to zero and the half-width grows by the clamped amount, so the
/// interval still reaches the original lower bound.
pub fn paired_difference_ci(
    workload: &[f64],
    baseline: &[f64],
    confidence_level: f64,
) -> Result<ConfidenceInterval, StatsError> {
    if workload.iter().chain(baseline).any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    paired_difference(Moments::of(workload), Moments::of(baseline), confidence_level)
}

/// Same estimator as [`paired_difference_ci`], fed from stored summaries.
pub fn paired_difference_ci_from_summaries(
    workload: &SummaryStats,
    baseline: &SummaryStats,
    confidence_level: f64,
) -> Result<ConfidenceInterval, StatsError> {
    paired_difference(workload.into(), baseline.into(), confidence_level)
}

fn paired_difference(a: Moments, b: Moments, confidence_level: f64) -> Result<ConfidenceInterval, StatsError> {
    let smallest = a.count.min(b.count);
    if smallest < 2 {
        return Err(StatsError::TooFewSamples { needed: 2, got: smallest });
    }

    let mean = a.mean - b.mean;
    let variance = a.var / a.count as f64 + b.var / b.count as f64;
    let t = critical_value(confidence_level, smallest - 1)?;
    let mut half_width = t * variance.sqrt();

    if mean < 0.0 {
        half_width += mean.abs();
        return Ok(ConfidenceInterval { mean: 0.0, half_width });
    }
    Ok(ConfidenceInterval { mean, half_width })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summary::{Profile, summary_stats};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_sided_conversion() {
        assert!(close(one_sided_level(0.99), 0.995));
        assert!(close(one_sided_level(0.95), 0.975));
    }

    #[test]
    fn identical_values_have_zero_width() {
        let ci = arithmetic_mean_ci(&[4.25; 6], 0.95).unwrap();
        assert_eq!(ci.mean, 4.25);
        assert_eq!(ci.half_width, 0.0);
    }

    #[test]
    fn arithmetic_interval_matches_reference() {
        // mean 5, population std 2, n 8; t(0.975, 7) = 2.3646242510102993
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let ci = arithmetic_mean_ci(&values, 0.95).unwrap();
        assert!(close(ci.mean, 5.0));
        assert!((ci.half_width - 2.364_624_251_010_299_3 * 2.0 / 7f64.sqrt()).abs() < 1e-7);
    }

    #[test]
    fn summary_interval_agrees_with_sample_interval() {
        let values = [10.0, 12.5, 9.75, 11.0];
        let from_samples = arithmetic_mean_ci(&values, 0.99).unwrap();
        let from_summary = mean_ci_from_summary(&summary_stats(&values, Profile::Compact), 0.99).unwrap();
        assert!(close(from_samples.mean, from_summary.mean));
        assert!(close(from_samples.half_width, from_summary.half_width));
    }

    #[test]
    fn single_sample_is_rejected() {
        assert_eq!(
            arithmetic_mean_ci(&[1.0], 0.95),
            Err(StatsError::TooFewSamples { needed: 2, got: 1 })
        );
    }

    #[test]
    fn invalid_level_is_rejected() {
        assert_eq!(
            arithmetic_mean_ci(&[1.0, 2.0], 1.0),
            Err(StatsError::InvalidConfidenceLevel(1.0))
        );
    }

    #[test]
    fn geometric_of_unit_ratios() {
        let ci = geometric_mean_ci(&[1.0; 5], 0.95).unwrap();
        assert!(close(ci.mean, 1.0));
        assert_eq!(ci.half_width_low, 0.0);
        assert_eq!(ci.half_width_high, 0.0);
    }

    #[test]
    fn geometric_interval_is_asymmetric() {
        let ci = geometric_mean_ci(&[0.9, 1.1, 1.3, 0.95, 1.05], 0.95).unwrap();
        assert!(ci.half_width_high > ci.half_width_low);
        assert!(ci.low() > 0.0);
        let log_ci = arithmetic_mean_ci(&[0.9f64.ln(), 1.1f64.ln(), 1.3f64.ln(), 0.95f64.ln(), 1.05f64.ln()], 0.95).unwrap();
        assert!(close(ci.low(), log_ci.low().exp()));
        assert!(close(ci.high(), log_ci.high().exp()));
    }

    #[test]
    fn geometric_rejects_non_positive() {
        assert_eq!(geometric_mean_ci(&[1.0, 0.0], 0.95), Err(StatsError::NonPositiveRatio(0.0)));
    }

    #[test]
    fn paired_difference_positive_mean() {
        let workload = [10.0, 11.0, 12.0, 13.0];
        let baseline = [1.0, 2.0, 3.0];
        let ci = paired_difference_ci(&workload, &baseline, 0.99).unwrap();
        assert!(close(ci.mean, 9.5));
        let variance = 1.25 / 4.0 + (2.0 / 3.0) / 3.0;
        let t = student_t::quantile(0.995, 2.0);
        assert!(close(ci.half_width, t * f64::sqrt(variance)));
    }

    #[test]
    fn paired_difference_clamps_negative_mean() {
        let workload = [1.0, 1.5, 2.0];
        let baseline = [4.0, 5.0, 6.0];
        let ci = paired_difference_ci(&workload, &baseline, 0.95).unwrap();

        let raw_mean: f64 = 1.5 - 5.0;
        let variance = (1.0 / 6.0) / 3.0 + (2.0 / 3.0) / 3.0;
        let raw_half_width = student_t::quantile(0.975, 2.0) * f64::sqrt(variance);

        assert_eq!(ci.mean, 0.0);
        assert!(close(ci.half_width, raw_half_width + raw_mean.abs()));
        // The lower bound still reaches the unclamped lower bound.
        assert!(close(ci.low(), raw_mean - raw_half_width));
    }

    #[test]
    fn paired_difference_from_summaries_matches_samples() {
        let workload = [7.0, 8.5, 9.0, 6.5];
        let baseline = [1.0, 1.25, 0.75, 1.0, 1.1];
        let direct = paired_difference_ci(&workload, &baseline, 0.99).unwrap();
        let stored = paired_difference_ci_from_summaries(
            &summary_stats(&workload, Profile::Full),
            &summary_stats(&baseline, Profile::Full),
            0.99,
        )
        .unwrap();
        assert!(close(direct.mean, stored.mean));
        assert!(close(direct.half_width, stored.half_width));
    }
}
