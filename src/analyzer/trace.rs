//! Extractor for the simulator's execution trace (its stdout).
//!
//! Heartbeats are bucketed by simulated time: every host reporting at the same
//! simulated instant contributes to one bucket, and the per-bucket send totals
//! form the packet and byte series.

use std::collections::BTreeMap;
use std::path::Path;

use super::log_loader::LogLoader;
use super::log_parser::parse_log_line;
use super::types::{HeartbeatTotals, TraceEvent, TraceSummary};
use crate::error::Result;

/// Fold trace lines into a [`TraceSummary`].
///
/// Counter dumps and the init marker are expected once; if repeated, the last
/// occurrence wins.
pub fn parse_trace_lines<I, S>(lines: I) -> TraceSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut summary = TraceSummary::default();
    let mut buckets: BTreeMap<u64, HeartbeatTotals> = BTreeMap::new();
    let mut skipped = 0usize;

    for line in lines {
        let Some(event) = parse_log_line(line.as_ref()) else {
            skipped += 1;
            continue;
        };

        match event {
            TraceEvent::Heartbeat {
                sim_time_nanos,
                packets_sent,
                packets_received,
                bytes_sent,
                bytes_received,
                ..
            } => {
                let bucket = buckets.entry(sim_time_nanos).or_default();
                bucket.packets_sent = bucket.packets_sent.saturating_add(packets_sent);
                bucket.packets_received = bucket.packets_received.saturating_add(packets_received);
                bucket.bytes_sent = bucket.bytes_sent.saturating_add(bytes_sent);
                bucket.bytes_received = bucket.bytes_received.saturating_add(bytes_received);
            }
            TraceEvent::SyscallCounts(counters) => summary.syscalls = counters,
            TraceEvent::ObjectCounts(counters) => summary.objects = counters,
            TraceEvent::InitComplete { real_time_secs } => summary.seconds_to_init = Some(real_time_secs),
        }
    }

    log::debug!("Trace: {} heartbeat buckets, {} lines without a marker", buckets.len(), skipped);

    for (sim_time_nanos, totals) in buckets {
        let sim_secs = sim_time_nanos as f64 / 1e9;
        summary.packets.push((sim_secs, totals.packets_sent));
        summary.bytes.push((sim_secs, totals.bytes_sent));
    }

    summary
}

/// Read the execution trace of one run.
pub fn parse_trace_log(path: &Path) -> Result<TraceSummary> {
    let lines = LogLoader::open(path)?.read_lines()?;
    Ok(parse_trace_lines(lines))
}
