//! Parse individual execution-trace lines and extract structured `TraceEvent` data.
//!
//! Supports the following line kinds:
//! - heartbeat: per-host cumulative network counters
//! - global syscall counter dump
//! - global object counter dump (braced and `key=value` variants)
//! - initialization complete (one marker per simulator variant)

use regex::Regex;
use std::sync::LazyLock;

use super::counters::parse_counter_dump;
use super::types::TraceEvent;

const HEARTBEAT_MARKER: &str = " [shadow-heartbeat] [node] ";

/// Which counter map a dump marker feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterKind {
    Syscalls,
    Objects,
}

/// Counter dump markers in match order; the payload after the marker may use either dump form.
const COUNTER_MARKERS: [(&str, CounterKind); 3] = [
    ("Global syscall counts:", CounterKind::Syscalls),
    ("Global allocated object counts:", CounterKind::Objects),
    ("ObjectCounter: counter values:", CounterKind::Objects),
];

static INIT_PROCESS_STARTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"process 'peer.*' started").expect("init marker pattern is valid"));

const INIT_MAIN_THREAD_BLOCKED: &str = "ran the pth main thread until it blocked";

/// Parse a trace line into an event.
///
/// Marker kinds are tried in a fixed order and the first match wins.
///
/// # Returns
///
/// `None` for lines that carry no marker or whose payload is malformed.
///
/// # Line Formats
///
/// ```text
/// heartbeat (real time, thread, simulated time, ..., then `;`-separated fields;
/// fields 3 and 4 are the receive and send counter lists):
/// 00:00:03.051920 [thread-4] 00:00:02.000000000 [info] [shadow-heartbeat] [node] peer7;;;0,0,0,0,0,0,15,0,7680;0,0,0,0,0,0,14,0,7168
///
/// counter dumps:
/// 00:10:01.000000 [main] n/a [info] Global syscall counts: {read:1204, write:88}
/// 00:10:01.000000 [main] n/a [info] ObjectCounter: counter values: event_new=5301 payload_new=88
///
/// initialization complete:
/// 00:00:07.250000 [thread-0] 00:00:01.000000000 [info] process 'peer1.tgen.1000' started
/// 00:00:07.250000 [thread-0] 00:00:01.000000000 [info] ran the pth main thread until it blocked
/// ```
pub fn parse_log_line(line: &str) -> Option<TraceEvent> {
    let line = line.trim();

    if let Some(idx) = line.find(HEARTBEAT_MARKER) {
        return parse_heartbeat(line, &line[idx + HEARTBEAT_MARKER.len()..]);
    }

    for (marker, kind) in COUNTER_MARKERS {
        if let Some(idx) = line.find(marker) {
            let counters = parse_counter_dump(&line[idx + marker.len()..])?;
            return Some(match kind {
                CounterKind::Syscalls => TraceEvent::SyscallCounts(counters),
                CounterKind::Objects => TraceEvent::ObjectCounts(counters),
            });
        }
    }

    if INIT_PROCESS_STARTED.is_match(line) || line.contains(INIT_MAIN_THREAD_BLOCKED) {
        let real_time_secs = clock_to_seconds(line.split(' ').next()?)?;
        return Some(TraceEvent::InitComplete { real_time_secs });
    }

    None
}

/// Parse the prefix timestamps and the counter fields of a heartbeat.
fn parse_heartbeat(line: &str, payload: &str) -> Option<TraceEvent> {
    let mut prefix = line.splitn(4, ' ');
    let real_time_secs = clock_to_seconds(prefix.next()?)?;
    let sim_time_nanos = clock_to_nanos(prefix.nth(1)?)?;

    let fields: Vec<&str> = payload.trim().split(';').collect();
    if fields.len() < 5 {
        return None;
    }
    let (packets_received, bytes_received) = payload_counters(fields[3])?;
    let (packets_sent, bytes_sent) = payload_counters(fields[4])?;

    Some(TraceEvent::Heartbeat {
        node: fields[0].to_string(),
        real_time_secs,
        sim_time_nanos,
        packets_sent,
        packets_received,
        bytes_sent,
        bytes_received,
    })
}

/// Packets carrying a payload (index 6) and payload bytes (index 8) of one counter list.
fn payload_counters(list: &str) -> Option<(u64, u64)> {
    let values: Vec<&str> = list.split(',').collect();
    let packets = values.get(6)?.trim().parse().ok()?;
    let bytes = values.get(8)?.trim().parse().ok()?;
    Some((packets, bytes))
}

/// Convert an `H:MM:SS.frac` clock reading to seconds.
pub fn clock_to_seconds(text: &str) -> Option<f64> {
    let mut parts = text.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !seconds.is_finite() {
        return None;
    }
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Convert an `H:MM:SS.frac` clock reading to integer nanoseconds without rounding loss.
pub fn clock_to_nanos(text: &str) -> Option<u64> {
    let mut parts = text.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (whole, frac) = seconds.split_once('.').unwrap_or((seconds, ""));
    let whole: u64 = whole.parse().ok()?;
    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let frac_nanos: u64 = if frac.is_empty() {
        0
    } else {
        frac.parse::<u64>().ok()? * 10u64.pow(9 - frac.len() as u32)
    };

    hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(whole)?
        .checked_mul(1_000_000_000)?
        .checked_add(frac_nanos)
}
