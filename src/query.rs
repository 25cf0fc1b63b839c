//! Field queries over record sequences, and metric scaling fits built on them.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{AnalyzerError, Result};
use crate::record::{MergedResults, RunConfig, RunRecord};
use crate::stats::{LinearFit, linear_regression};

/// Equality test of one configuration field, addressed by a dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub path: String,
    pub value: Value,
}

impl Filter {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// An absent field compares equal to `null`.
    pub fn matches(&self, config: &RunConfig) -> bool {
        lookup(config, &self.path).unwrap_or(&Value::Null) == &self.value
    }
}

/// Parses `path=value`. The value is read as JSON, falling back to a plain
/// string, so `interpose_method=ptrace` and `exe.quantity=4000` both work.
impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (path, raw) = s
            .split_once('=')
            .ok_or_else(|| format!("expected <path>=<value>, got '{s}'"))?;
        let path = path.trim();
        if path.is_empty() {
            return Err(format!("empty field path in '{s}'"));
        }
        let value = serde_json::from_str(raw.trim()).unwrap_or_else(|_| Value::String(raw.trim().to_string()));
        Ok(Self::new(path, value))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.path, self.value)
    }
}

/// Resolve a dotted path such as `exe.quantity` inside a configuration.
pub fn lookup<'a>(config: &'a RunConfig, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut value = config.get(segments.next()?)?;
    for segment in segments {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

pub fn matches_filters(config: &RunConfig, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| filter.matches(config))
}

fn describe(filters: &[Filter]) -> String {
    let parts: Vec<String> = filters.iter().map(Filter::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// The single record satisfying every filter.
pub fn select_unique<'a, R>(records: &'a [RunRecord<R>], filters: &[Filter]) -> Result<&'a RunRecord<R>> {
    let matched: Vec<&RunRecord<R>> = records.iter().filter(|r| matches_filters(&r.config, filters)).collect();

    match matched.as_slice() {
        [record] => Ok(*record),
        [] => Err(AnalyzerError::NoMatch {
            batch: 0,
            shape: describe(filters),
            candidates: Vec::new(),
        }),
        many => Err(AnalyzerError::AmbiguousMatch {
            batch: 0,
            shape: describe(filters),
            matches: many
                .iter()
                .map(|r| Value::Object(r.config.clone()).to_string())
                .collect(),
        }),
    }
}

/// A metric's cross-trial mean regressed on a numeric configuration field.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingFit {
    /// `(x, mean)` pairs in ascending `x`.
    pub points: Vec<(f64, f64)>,
    pub fit: LinearFit,
}

/// Fit `metric` against the configuration field at `x_path` over the records
/// selected by `filters`. Every `x` must be covered by exactly one record.
pub fn scaling_fit(
    records: &[RunRecord<MergedResults>],
    x_path: &str,
    metric: &str,
    filters: &[Filter],
) -> Result<ScalingFit> {
    let mut xs_seen: Vec<&Value> = Vec::new();
    for record in records.iter().filter(|r| matches_filters(&r.config, filters)) {
        let x = lookup(&record.config, x_path)
            .filter(|v| v.is_number())
            .ok_or_else(|| AnalyzerError::missing_metric(x_path, "not a numeric configuration field"))?;
        if !xs_seen.contains(&x) {
            xs_seen.push(x);
        }
    }

    let mut points: Vec<(f64, f64)> = Vec::with_capacity(xs_seen.len());
    for x_value in xs_seen {
        let mut point_filters = filters.to_vec();
        point_filters.push(Filter::new(x_path, x_value.clone()));
        let record = select_unique(records, &point_filters)?;

        let x = x_value.as_f64().unwrap_or_default();
        let y = record
            .results
            .get(metric)
            .ok_or_else(|| AnalyzerError::missing_metric(metric, format!("no summary at {x_path}={x_value}")))?
            .mean;
        points.push((x, y));
    }

    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    log::debug!("Fitting {} against {} over {} points", metric, x_path, points.len());

    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    let fit = linear_regression(&xs, &ys)?;
    Ok(ScalingFit { points, fit })
}
