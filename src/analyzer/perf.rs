//! Extractor for `perf stat -x ';'` output captured on the simulator's stderr.

use std::path::Path;

use super::log_loader::LogLoader;
use super::types::{CounterMap, CounterValue};
use crate::error::Result;

/// Key under which perf's `duration_time` counter is stored.
pub const DURATION_KEY: &str = "duration-time-nanos";
/// Key under which perf's `task-clock` counter is stored.
pub const TASK_CLOCK_KEY: &str = "task-clock-msec";

/// Parse one `value;unit;event;...` record.
///
/// Comment lines (leading `*`), lines with fewer than three fields and values
/// perf could not count (e.g. `<not counted>`) yield `None`.
pub fn parse_perf_line(line: &str) -> Option<(String, CounterValue)> {
    if line.starts_with('*') {
        return None;
    }
    let parts: Vec<&str> = line.trim().split(';').collect();
    if parts.len() < 3 {
        return None;
    }

    let value = parts[0].trim();
    match parts[2] {
        "duration_time" => Some((DURATION_KEY.to_string(), CounterValue::Int(value.parse().ok()?))),
        "task-clock" => Some((TASK_CLOCK_KEY.to_string(), CounterValue::Float(value.parse().ok()?))),
        name => Some((name.to_string(), CounterValue::Int(value.parse().ok()?))),
    }
}

pub fn parse_perf_lines<I, S>(lines: I) -> CounterMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counters = CounterMap::new();
    for line in lines {
        match parse_perf_line(line.as_ref()) {
            Some((name, value)) => {
                counters.insert(name, value);
            }
            None => log::trace!("Skipping perf line: {}", line.as_ref()),
        }
    }
    counters
}

/// Read the perf counters of one run.
pub fn parse_perf_log(path: &Path) -> Result<CounterMap> {
    let lines = LogLoader::open(path)?.read_lines()?;
    Ok(parse_perf_lines(lines))
}
