//! Combine repeated trial batches of one experiment matrix into per-experiment summaries.
//!
//! Each batch is the record sequence of one full collection pass. Runs are
//! matched across batches by their [`CanonicalShape`], and every shape must
//! appear exactly once in every batch.

pub mod canonical;
pub mod reduce;

pub use canonical::{CanonicalShape, ShapeRules};
pub use reduce::{DURATION_SECS_KEY, merge_results};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalyzerError, Result};
use crate::record::{MergedResults, ResultsBlock, RunRecord, read_records};

/// Select the single record of `batch` whose shape is `shape`.
pub fn select<'a, R>(
    batch: &'a [RunRecord<R>],
    shape: &CanonicalShape,
    batch_index: usize,
    rules: &ShapeRules,
) -> Result<&'a RunRecord<R>> {
    let matched: Vec<&RunRecord<R>> = batch.iter().filter(|r| shape.matches(&r.config, rules)).collect();

    match matched.as_slice() {
        [record] => Ok(*record),
        [] => Err(AnalyzerError::NoMatch {
            batch: batch_index,
            shape: shape.to_string(),
            candidates: batch
                .iter()
                .map(|r| CanonicalShape::of(&r.config, rules).to_string())
                .collect(),
        }),
        many => Err(AnalyzerError::AmbiguousMatch {
            batch: batch_index,
            shape: shape.to_string(),
            matches: many
                .iter()
                .map(|r| serde_json::Value::Object(r.config.clone()).to_string())
                .collect(),
        }),
    }
}

/// Merge trial batches into one record per experiment, in first-seen order.
///
/// Nothing is returned unless every shape matched exactly once in every batch.
pub fn merge_trials(batches: &[Vec<RunRecord<ResultsBlock>>], rules: &ShapeRules) -> Result<Vec<RunRecord<MergedResults>>> {
    let mut shapes: Vec<CanonicalShape> = Vec::new();
    for record in batches.iter().flatten() {
        let shape = CanonicalShape::of(&record.config, rules);
        if !shapes.contains(&shape) {
            shapes.push(shape);
        }
    }
    log::debug!("{} experiments across {} trial batches", shapes.len(), batches.len());

    let mut merged = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let results = batches
            .iter()
            .enumerate()
            .map(|(index, batch)| select(batch, &shape, index, rules).map(|r| &r.results))
            .collect::<Result<Vec<_>>>()?;
        let summary = merge_results(&results)?;
        merged.push(RunRecord::new(shape.into_config(), summary)?);
    }
    Ok(merged)
}

/// Collected trial files of a phase (names containing `phase<N>-`), sorted by name.
pub fn trial_files(data_dir: &Path, phase: u32) -> Result<Vec<PathBuf>> {
    let token = format!("phase{phase}-");
    let entries = fs::read_dir(data_dir).map_err(|e| AnalyzerError::missing_input(data_dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_name().to_string_lossy().contains(&token) {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every trial file of `phase` and merge them.
pub fn combine_phase(data_dir: &Path, phase: u32, rules: &ShapeRules) -> Result<Vec<RunRecord<MergedResults>>> {
    let paths = trial_files(data_dir, phase)?;
    if paths.is_empty() {
        return Err(AnalyzerError::InvalidInput {
            path: data_dir.to_path_buf(),
            reason: format!("no trial files for phase {phase}"),
        });
    }

    let batches = paths
        .iter()
        .map(|path| {
            log::info!("Loading trial {}", path.display());
            read_records(path)
        })
        .collect::<Result<Vec<_>>>()?;
    merge_trials(&batches, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{CounterMap, CounterValue, MemUsage, TraceSummary};
    use crate::analyzer::perf::DURATION_KEY;
    use crate::record::{RunConfig, write_json};
    use serde_json::json;

    fn results(duration_secs: i64) -> ResultsBlock {
        let trace = TraceSummary {
            seconds_to_init: Some(1.5),
            syscalls: CounterMap::from([("read".to_string(), CounterValue::Int(7))]),
            objects: CounterMap::from([
                ("Event".to_string(), CounterValue::Int(100)),
                ("Payload".to_string(), CounterValue::Int(10)),
            ]),
            packets: vec![(1.0, 5), (2.0, 5)],
            bytes: vec![(1.0, 500), (2.0, 500)],
        };
        let perf = CounterMap::from([(DURATION_KEY.to_string(), CounterValue::Int(duration_secs * 1_000_000_000))]);
        ResultsBlock::from_extracts(perf, trace, MemUsage::from([(1, 0), (2, 4096)]))
    }

    fn record(workers: u64, seed: u64) -> RunRecord<ResultsBlock> {
        let config = json!({
            "num_workers": workers,
            "seed": seed,
            "label": format!("w{workers}-s{seed}"),
            "exe": {"quantity": 1000, "seed": seed, "cmd": "tgen"},
        });
        let serde_json::Value::Object(config) = config else {
            panic!("expected object");
        };
        RunRecord::new(config, results(10 + seed as i64)).unwrap()
    }

    fn workers(config: &RunConfig) -> u64 {
        config["num_workers"].as_u64().unwrap()
    }

    #[test]
    fn merges_shuffled_batches() {
        let batches = vec![
            vec![record(1, 1), record(2, 1), record(4, 1)],
            vec![record(4, 2), record(1, 2), record(2, 2)],
        ];
        let merged = merge_trials(&batches, &ShapeRules::default()).unwrap();

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.iter().map(|r| workers(&r.config)).collect::<Vec<_>>(), vec![1, 2, 4]);
        for record in &merged {
            assert!(!record.config.contains_key("seed"));
            assert!(!record.config.contains_key("label"));
            assert_eq!(record.config["exe"], json!({"quantity": 1000}));
            for stats in record.results.values() {
                assert_eq!(stats.count, 2);
            }
            assert_eq!(record.results[DURATION_SECS_KEY].min, 11.0);
            assert_eq!(record.results[DURATION_SECS_KEY].max, 12.0);
        }
    }

    #[test]
    fn missing_experiment_in_later_batch_is_no_match() {
        let batches = vec![vec![record(1, 1), record(2, 1)], vec![record(1, 2)]];
        let err = merge_trials(&batches, &ShapeRules::default()).unwrap_err();
        let AnalyzerError::NoMatch { batch, candidates, .. } = err else {
            panic!("Expected NoMatch, got {err:?}");
        };
        assert_eq!(batch, 1);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn duplicate_experiment_in_batch_is_ambiguous() {
        let batches = vec![vec![record(1, 1), record(1, 3)], vec![record(1, 2)]];
        let err = merge_trials(&batches, &ShapeRules::default()).unwrap_err();
        let AnalyzerError::AmbiguousMatch { batch, matches, .. } = err else {
            panic!("Expected AmbiguousMatch, got {err:?}");
        };
        assert_eq!(batch, 0);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn combines_phase_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write_json(&dir.path().join("trial1-phase2-results.json"), &vec![record(1, 1), record(2, 1)]).unwrap();
        write_json(&dir.path().join("trial2-phase2-results.json"), &vec![record(2, 2), record(1, 2)]).unwrap();
        write_json(&dir.path().join("trial1-phase3-results.json"), &vec![record(8, 1)]).unwrap();

        let files = trial_files(dir.path(), 2).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("trial1-phase2-results.json"));

        let merged = combine_phase(dir.path(), 2, &ShapeRules::default()).unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|r| r.results["packets"].count == 2));
    }

    #[test]
    fn phase_without_files_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            combine_phase(dir.path(), 5, &ShapeRules::default()),
            Err(AnalyzerError::InvalidInput { .. })
        ));
    }
}
