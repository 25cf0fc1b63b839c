//! Descriptive statistics and confidence-interval estimators.
//!
//! Everything here is pure: functions take slices or stored summaries and
//! return values, with precondition failures reported as [`StatsError`].

pub mod interval;
pub mod regression;
pub mod student_t;
pub mod summary;

pub use interval::{
    AsymmetricInterval, ConfidenceInterval, arithmetic_mean_ci, geometric_mean_ci, mean_ci_from_summary,
    one_sided_level, paired_difference_ci, paired_difference_ci_from_summaries,
};
pub use regression::{LinearFit, linear_regression};
pub use summary::{PERCENTILE_STEPS, Profile, SummaryStats, summary_stats};

use thiserror::Error;

/// Precondition failures of the statistics engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("need at least {needed} samples, got {got}")]
    TooFewSamples { needed: usize, got: usize },

    #[error("confidence level {0} is not strictly between 0 and 1")]
    InvalidConfidenceLevel(f64),

    #[error("geometric mean requires positive ratios, got {0}")]
    NonPositiveRatio(f64),

    #[error("input contains a non-finite value")]
    NonFinite,

    #[error("regression input is degenerate: {0}")]
    Degenerate(&'static str),
}
