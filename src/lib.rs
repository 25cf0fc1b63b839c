//! Performance extraction and trial statistics for discrete-event network simulator benchmarks.
//!
//! The pipeline has two passes:
//! - collection: [`analyzer`] extractors parse each run directory's logs and
//!   [`record`] attaches the results to the run's configuration
//! - combination: [`merge`] matches runs across repeated trial batches and
//!   reduces them with [`stats`] into per-experiment summaries
//!
//! [`query`] selects records from either output for interval and scaling analysis.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod merge;
pub mod query;
pub mod record;
pub mod stats;

pub use config::AnalysisConfig;
pub use error::{AnalyzerError, Result};
pub use merge::{CanonicalShape, ShapeRules, combine_phase, merge_trials};
pub use record::{MergedResults, MicroResults, ResultsBlock, RunConfig, RunRecord};
