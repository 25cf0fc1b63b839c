//! Summary statistics over a list of samples.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentile points recorded by the [`Profile::Full`] profile: 5, 10, ..., 95.
pub const PERCENTILE_STEPS: [u8; 19] = [5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95];

/// Which statistics a summary carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Single-run series: adds `sum` and the 19 percentile points.
    Full,
    /// Cross-trial reductions, where sample sizes are too small for percentiles.
    Compact,
}

/// Descriptive statistics of one sample list.
///
/// `std` and `var` are population statistics (divide by n). Percentiles are
/// serialized as flat `p5`..`p95` keys next to the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub var: f64,
    #[serde(flatten)]
    pub percentiles: BTreeMap<String, f64>,
}

impl SummaryStats {
    /// Look up a recorded percentile, e.g. `percentile(95)`.
    pub fn percentile(&self, p: u8) -> Option<f64> {
        self.percentiles.get(&percentile_key(p)).copied()
    }
}

fn percentile_key(p: u8) -> String {
    format!("p{p}")
}

/// Summarize `values` under the given profile.
///
/// An empty list produces a zero-count summary with every statistic at `0.0`,
/// so callers can always store a summary even when a series never appeared.
pub fn summary_stats(values: &[f64], profile: Profile) -> SummaryStats {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let (min, max, mean, median, var) = if count == 0 {
        (0.0, 0.0, 0.0, 0.0, 0.0)
    } else {
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        (sorted[0], sorted[count - 1], mean, percentile_of_sorted(&sorted, 50.0), var)
    };

    let mut stats = SummaryStats {
        count,
        sum: None,
        min,
        max,
        mean,
        median,
        std: var.sqrt(),
        var,
        percentiles: BTreeMap::new(),
    };

    if profile == Profile::Full {
        stats.sum = Some(sorted.iter().sum());
        for p in PERCENTILE_STEPS {
            let value = if count == 0 { 0.0 } else { percentile_of_sorted(&sorted, f64::from(p)) };
            stats.percentiles.insert(percentile_key(p), value);
        }
    }

    stats
}

/// Linearly interpolated percentile; `sorted` must be ascending and non-empty.
fn percentile_of_sorted(sorted: &[f64], pct: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}
