//! Run records: a run's configuration with its results attached under `~results`.

pub mod builder;
pub mod store;

pub use builder::{
    collect_micro_run, collect_micro_runs, collect_run, collect_runs, find_peer_log, load_run_config, run_directories,
};
pub use store::{read_records, render_json, write_json};

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyzer::{CounterMap, MemUsage, PeerTimings, TraceSummary};
use crate::error::{AnalyzerError, Result};
use crate::stats::{Profile, SummaryStats, summary_stats};

/// Reserved key holding the results. `~` sorts after every alphanumeric key.
pub const RESULTS_KEY: &str = "~results";

/// Free-form run configuration, as loaded from the run's config document.
pub type RunConfig = serde_json::Map<String, serde_json::Value>;

/// Results of one macro-benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsBlock {
    pub perf: CounterMap,
    pub syscalls: CounterMap,
    pub objects: CounterMap,
    pub packets_per_second: SummaryStats,
    pub bytes_per_second: SummaryStats,
    /// Absent when the trace never logged initialization completing.
    #[serde(default)]
    pub seconds_to_init: Option<f64>,
    pub mem_used: MemUsage,
}

impl ResultsBlock {
    /// Assemble a results block from the extractor outputs of one run.
    pub fn from_extracts(perf: CounterMap, trace: TraceSummary, mem_used: MemUsage) -> Self {
        let packets_per_second = summary_stats(&trace.packet_values(), Profile::Full);
        let bytes_per_second = summary_stats(&trace.byte_values(), Profile::Full);
        Self {
            perf,
            syscalls: trace.syscalls,
            objects: trace.objects,
            packets_per_second,
            bytes_per_second,
            seconds_to_init: trace.seconds_to_init,
            mem_used,
        }
    }
}

/// Results of one micro-benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroResults {
    pub perf: CounterMap,
    /// Per-call time of the benchmarked operation, in microseconds.
    pub bmark: SummaryStats,
    /// Per-call time of the no-op baseline, in microseconds.
    pub noop: SummaryStats,
    pub syscalls: CounterMap,
}

impl MicroResults {
    pub fn from_extracts(perf: CounterMap, timings: &PeerTimings, syscalls: CounterMap) -> Self {
        Self {
            perf,
            bmark: summary_stats(&timings.workload_usecs, Profile::Full),
            noop: summary_stats(&timings.noop_usecs, Profile::Full),
            syscalls,
        }
    }
}

/// Cross-trial summaries keyed by metric name.
pub type MergedResults = BTreeMap<String, SummaryStats>;

/// A run configuration with its results.
///
/// Serialized as the configuration object with one extra `~results` key.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord<R> {
    pub config: RunConfig,
    pub results: R,
}

impl<R> RunRecord<R> {
    /// Attach results to a configuration.
    ///
    /// Fails if the configuration already uses the reserved results key.
    pub fn new(config: RunConfig, results: R) -> Result<Self> {
        if config.contains_key(RESULTS_KEY) {
            return Err(AnalyzerError::InvalidInput {
                path: Default::default(),
                reason: format!("run configuration already contains the reserved key '{RESULTS_KEY}'"),
            });
        }
        Ok(Self { config, results })
    }
}

impl<R: Serialize> Serialize for RunRecord<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.config.len() + 1))?;
        for (key, value) in &self.config {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(RESULTS_KEY, &self.results)?;
        map.end()
    }
}

impl<'de, R: DeserializeOwned> Deserialize<'de> for RunRecord<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut config = RunConfig::deserialize(deserializer)?;
        let results = config
            .remove(RESULTS_KEY)
            .ok_or_else(|| de::Error::missing_field(RESULTS_KEY))?;
        let results = R::deserialize(results).map_err(de::Error::custom)?;
        Ok(Self { config, results })
    }
}
