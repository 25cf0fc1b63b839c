//! Extractor for periodic `date` + `free` samples taken while the simulator ran.
//!
//! The log interleaves a UTC timestamp line, the `free` header (columns named
//! once) and a `Mem:` row per sample:
//!
//! ```text
//! 2021-10-12 18:05:11+00:00
//!               total        used        free      shared  buff/cache   available
//! Mem:    33554432000  5368709120 25769803776    10485760  2415919104 27648851968
//! ```

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::Path;

use super::log_loader::LogLoader;
use super::types::MemUsage;
use crate::error::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Compute per-timestamp workload memory usage.
///
/// `used = total - available` per sample; the smallest usage over the run is
/// taken as system overhead and subtracted from every sample. Only the first
/// sample at each timestamp is kept.
pub fn parse_memory_lines<I, S>(lines: I) -> MemUsage
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut raw: BTreeMap<i64, i64> = BTreeMap::new();
    let mut last_timestamp: Option<i64> = None;
    let mut header: Option<Vec<String>> = None;

    for line in lines {
        let line = line.as_ref().trim();

        if line.contains("+00") {
            let stamp = line.split('+').next().unwrap_or_default().trim();
            match NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) {
                Ok(dt) => last_timestamp = Some(dt.and_utc().timestamp()),
                Err(e) => log::debug!("Skipping memory timestamp '{}': {}", stamp, e),
            }
        } else if header.is_none() && line.contains("total") {
            header = Some(line.split_whitespace().map(str::to_string).collect());
        } else if line.contains("Mem:") {
            let (Some(timestamp), Some(columns)) = (last_timestamp, header.as_deref()) else {
                log::debug!("Skipping memory sample without timestamp or header: {}", line);
                continue;
            };
            match used_bytes(columns, line) {
                Some(used) => {
                    raw.entry(timestamp).or_insert(used);
                }
                None => log::debug!("Skipping malformed memory sample: {}", line),
            }
        }
    }

    let Some(baseline) = raw.values().copied().min() else {
        return MemUsage::new();
    };
    raw.into_iter()
        .map(|(timestamp, used)| (timestamp, (used - baseline) as u64))
        .collect()
}

fn used_bytes(columns: &[String], line: &str) -> Option<i64> {
    let counts: Vec<i64> = line
        .split_whitespace()
        .skip(1)
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;

    let column = |name: &str| columns.iter().position(|c| c == name).and_then(|i| counts.get(i)).copied();
    Some(column("total")? - column("available")?)
}

/// Read the memory samples of one run.
pub fn parse_memory_log(path: &Path) -> Result<MemUsage> {
    let lines = LogLoader::open(path)?.read_lines()?;
    Ok(parse_memory_lines(lines))
}
