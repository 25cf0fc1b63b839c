//! Extractors that turn captured simulator logs into structured results.
//!
//! One extractor per log format:
//! - perf counters (`stderr`)
//! - execution trace (`stdout`): heartbeats, counter dumps, init marker
//! - memory samples (`free.log`)
//! - micro-benchmark peer output
//!
//! Every extractor opens exactly one file, skips lines it does not recognize,
//! and fails only when the file itself cannot be opened.

pub mod counters;
pub mod log_loader;
pub mod log_parser;
pub mod memory;
pub mod peer;
pub mod perf;
pub mod trace;
pub mod types;

pub use log_loader::LogLoader;
pub use memory::parse_memory_log;
pub use peer::parse_peer_log;
pub use perf::parse_perf_log;
pub use trace::parse_trace_log;
pub use types::{CounterMap, CounterValue, MemUsage, MetricSeries, PeerTimings, TraceEvent, TraceSummary};
