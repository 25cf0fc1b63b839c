//! Type definitions specific to the analyzer module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A counter reading; perf reports most counters as integers but some as floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CounterValue {
    Int(i64),
    Float(f64),
}

impl CounterValue {
    pub fn as_f64(self) -> f64 {
        match self {
            CounterValue::Int(v) => v as f64,
            CounterValue::Float(v) => v,
        }
    }

    /// Parse an integer if possible, otherwise a float.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(v) = text.parse::<i64>() {
            return Some(CounterValue::Int(v));
        }
        text.parse::<f64>().ok().filter(|v| v.is_finite()).map(CounterValue::Float)
    }
}

impl From<i64> for CounterValue {
    fn from(v: i64) -> Self {
        CounterValue::Int(v)
    }
}

impl From<f64> for CounterValue {
    fn from(v: f64) -> Self {
        CounterValue::Float(v)
    }
}

/// Event or symbol name to count. Key sets differ between simulator variants.
pub type CounterMap = BTreeMap<String, CounterValue>;

/// Workload memory usage in bytes, keyed by Unix timestamp (seconds).
pub type MemUsage = BTreeMap<i64, u64>;

/// `(simulated seconds, aggregate value)` pairs in simulated-time order.
pub type MetricSeries = Vec<(f64, u64)>;

/// Parsed execution-trace line variants.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// `[shadow-heartbeat] [node]` - cumulative network counters of one host.
    Heartbeat {
        node: String,
        real_time_secs: f64,
        sim_time_nanos: u64,
        packets_sent: u64,
        packets_received: u64,
        bytes_sent: u64,
        bytes_received: u64,
    },
    /// Global syscall counter dump, logged once at shutdown.
    SyscallCounts(CounterMap),
    /// Global allocated object counter dump, logged once at shutdown.
    ObjectCounts(CounterMap),
    /// The simulator finished starting its processes.
    InitComplete { real_time_secs: f64 },
}

/// Send/receive totals of all hosts reporting at one simulated instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatTotals {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Everything the execution-trace extractor pulls out of one trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceSummary {
    /// Wall-clock seconds until initialization completed; `None` if never logged.
    pub seconds_to_init: Option<f64>,
    pub syscalls: CounterMap,
    pub objects: CounterMap,
    pub packets: MetricSeries,
    pub bytes: MetricSeries,
}

impl TraceSummary {
    pub fn packet_values(&self) -> Vec<f64> {
        self.packets.iter().map(|(_, v)| *v as f64).collect()
    }

    pub fn byte_values(&self) -> Vec<f64> {
        self.bytes.iter().map(|(_, v)| *v as f64).collect()
    }
}

/// Per-call timings from a micro-benchmark peer log, in microseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerTimings {
    /// Baseline calls that do no work.
    pub noop_usecs: Vec<f64>,
    /// Calls that perform the benchmarked operation.
    pub workload_usecs: Vec<f64>,
}
