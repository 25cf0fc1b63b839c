//! Extractor for the micro-benchmark peer process output.
//!
//! ```text
//! [benchmark] Time spent in no-op function call: 0.000412 milliseconds
//! [benchmark] Time spent in nanosleep function call: 0.004857 milliseconds
//! [benchmark] Time spent in write/read function call: 0.012003 milliseconds
//! ```

use std::path::Path;

use super::log_loader::LogLoader;
use super::types::PeerTimings;
use crate::error::Result;

const TIMING_PHRASE: &str = "Time spent in";
const CALL_PHRASE: &str = "function call";
const WORKLOAD_PHRASES: [&str; 2] = ["write/read function call", "nanosleep function call"];
const NOOP_PHRASE: &str = "no-op function call";

/// Index of the millisecond value among the whitespace-separated tokens.
const VALUE_TOKEN: usize = 7;

/// Collect per-call timings, converted from milliseconds to microseconds
/// rounded to three decimals.
pub fn parse_peer_lines<I, S>(lines: I) -> PeerTimings
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut timings = PeerTimings::default();

    for line in lines {
        let line = line.as_ref();
        if !(line.contains(TIMING_PHRASE) && line.contains(CALL_PHRASE)) {
            continue;
        }

        let Some(millis) = line
            .split_whitespace()
            .nth(VALUE_TOKEN)
            .and_then(|token| token.parse::<f64>().ok())
        else {
            log::trace!("Skipping peer timing line: {}", line);
            continue;
        };
        let usecs = (millis * 1000.0 * 1000.0).round() / 1000.0;

        if WORKLOAD_PHRASES.iter().any(|phrase| line.contains(phrase)) {
            timings.workload_usecs.push(usecs);
        } else if line.contains(NOOP_PHRASE) {
            timings.noop_usecs.push(usecs);
        }
    }

    timings
}

/// Read the peer timings of one micro-benchmark run.
pub fn parse_peer_log(path: &Path) -> Result<PeerTimings> {
    let lines = LogLoader::open(path)?.read_lines()?;
    Ok(parse_peer_lines(lines))
}
