//! Build run records from simulator run directories.

use std::fs;
use std::path::{Path, PathBuf};

use super::{MicroResults, ResultsBlock, RunConfig, RunRecord};
use crate::analyzer::{parse_memory_log, parse_peer_log, parse_perf_log, parse_trace_log};
use crate::config::AnalysisConfig;
use crate::error::{AnalyzerError, Result};

/// Load a run's configuration document; it must be a JSON object.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let data = fs::read_to_string(path).map_err(|e| AnalyzerError::missing_input(path, e))?;
    let value: serde_json::Value = serde_json::from_str(&data).map_err(|e| AnalyzerError::InvalidInput {
        path: path.to_path_buf(),
        reason: format!("Invalid JSON format: {e}"),
    })?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(AnalyzerError::InvalidInput {
            path: path.to_path_buf(),
            reason: format!("expected a JSON object, found {other}"),
        }),
    }
}

/// Subdirectories of `base` whose name contains `marker`, sorted by name.
pub fn run_directories(base: &Path, marker: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(base).map_err(|e| AnalyzerError::missing_input(base, e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().contains(marker) && path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Parse every log of one macro-benchmark run and attach the results to its configuration.
pub fn collect_run(run_dir: &Path, config: &AnalysisConfig) -> Result<RunRecord<ResultsBlock>> {
    log::debug!("Collecting {}", run_dir.display());
    let run_config = load_run_config(&run_dir.join(&config.run_config_file))?;

    let perf = parse_perf_log(&run_dir.join(&config.perf_log))?;
    let trace = parse_trace_log(&run_dir.join(&config.trace_log))?;
    let mem_used = parse_memory_log(&run_dir.join(&config.memory_log))?;

    RunRecord::new(run_config, ResultsBlock::from_extracts(perf, trace, mem_used))
}

/// Collect every qualifying run directory below `base`.
pub fn collect_runs(base: &Path, config: &AnalysisConfig) -> Result<Vec<RunRecord<ResultsBlock>>> {
    log::info!("Parsing results from {}", base.display());
    let records = run_directories(base, &config.run_dir_marker)?
        .iter()
        .map(|dir| collect_run(dir, config))
        .collect::<Result<Vec<_>>>()?;
    log::info!("Collected {} runs", records.len());
    Ok(records)
}

/// Locate the peer's benchmark output: the first file, by name, containing every token.
pub fn find_peer_log(peer_dir: &Path, tokens: &[String]) -> Result<PathBuf> {
    let entries = fs::read_dir(peer_dir).map_err(|e| AnalyzerError::missing_input(peer_dir, e))?;

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    names
        .into_iter()
        .find(|name| tokens.iter().all(|token| name.contains(token.as_str())))
        .map(|name| peer_dir.join(name))
        .ok_or_else(|| {
            AnalyzerError::missing_input(
                peer_dir,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no file name containing all of {tokens:?}"),
                ),
            )
        })
}

/// Parse one micro-benchmark run: perf counters, syscall counts and peer call timings.
pub fn collect_micro_run(run_dir: &Path, config: &AnalysisConfig) -> Result<RunRecord<MicroResults>> {
    log::debug!("Collecting micro-benchmark {}", run_dir.display());
    let run_config = load_run_config(&run_dir.join(&config.run_config_file))?;

    let peer_log = find_peer_log(&run_dir.join(&config.peer_log_dir), &config.peer_log_tokens)?;
    let perf = parse_perf_log(&run_dir.join(&config.perf_log))?;
    let trace = parse_trace_log(&run_dir.join(&config.trace_log))?;
    let timings = parse_peer_log(&peer_log)?;

    RunRecord::new(run_config, MicroResults::from_extracts(perf, &timings, trace.syscalls))
}

pub fn collect_micro_runs(base: &Path, config: &AnalysisConfig) -> Result<Vec<RunRecord<MicroResults>>> {
    log::info!("Parsing micro-benchmark results from {}", base.display());
    run_directories(base, &config.run_dir_marker)?
        .iter()
        .map(|dir| collect_micro_run(dir, config))
        .collect()
}
