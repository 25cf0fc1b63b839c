//! Cross-trial reduction of results blocks into per-metric summaries.

use crate::analyzer::CounterMap;
use crate::analyzer::perf::DURATION_KEY;
use crate::error::{AnalyzerError, Result};
use crate::record::{MergedResults, ResultsBlock};
use crate::stats::{Profile, SummaryStats, summary_stats};

const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;
const NANOS_PER_SEC: f64 = 1e9;

/// Object counter names, in lookup order, across simulator variants.
const OBJECT_EVENT_NAMES: [&str; 2] = ["Event", "event_new"];
const OBJECT_PAYLOAD_NAMES: [&str; 2] = ["Payload", "payload_new"];

/// Merged key of the duration counter, converted to seconds.
pub const DURATION_SECS_KEY: &str = "perf_duration-time-sec";

/// Reduce the results of one experiment's trials into compact summaries.
///
/// The perf keys are taken from the first trial; every later trial must carry
/// them too. A metric missing from any trial fails the whole reduction.
pub fn merge_results(results: &[&ResultsBlock]) -> Result<MergedResults> {
    let Some(first) = results.first() else {
        return Ok(MergedResults::new());
    };

    let mut merged = MergedResults::new();
    let mut add = |metric: String, derive: &dyn Fn(&ResultsBlock) -> Option<f64>| -> Result<()> {
        let stats = across(results, &metric, derive)?;
        merged.insert(metric, stats);
        Ok(())
    };

    add("packets".into(), &|r| r.packets_per_second.sum)?;
    add("payload_gib".into(), &|r| r.bytes_per_second.sum.map(|b| b / BYTES_PER_GIB))?;
    add("mem_used_gib".into(), &|r| {
        r.mem_used.values().max().map(|&m| m as f64 / BYTES_PER_GIB)
    })?;
    add("object_events".into(), &|r| first_available(&r.objects, &OBJECT_EVENT_NAMES))?;
    add("object_payloads".into(), &|r| first_available(&r.objects, &OBJECT_PAYLOAD_NAMES))?;
    add("seconds_to_init".into(), &|r| r.seconds_to_init)?;
    add("seconds_post_init".into(), &|r| {
        let duration = r.perf.get(DURATION_KEY)?.as_f64() / NANOS_PER_SEC;
        Some(duration - r.seconds_to_init?)
    })?;
    add("syscalls".into(), &|r| Some(r.syscalls.values().map(|v| v.as_f64()).sum()))?;

    for key in first.perf.keys() {
        if key == DURATION_KEY {
            add(DURATION_SECS_KEY.into(), &|r| Some(r.perf.get(key)?.as_f64() / NANOS_PER_SEC))?;
        } else {
            add(format!("perf_{key}"), &|r| Some(r.perf.get(key)?.as_f64()))?;
        }
    }

    Ok(merged)
}

fn across(results: &[&ResultsBlock], metric: &str, derive: &dyn Fn(&ResultsBlock) -> Option<f64>) -> Result<SummaryStats> {
    let values = results
        .iter()
        .enumerate()
        .map(|(trial, r)| {
            derive(r).ok_or_else(|| AnalyzerError::missing_metric(metric, format!("no value in trial {trial}")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(summary_stats(&values, Profile::Compact))
}

fn first_available(counters: &CounterMap, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|name| counters.get(*name)).map(|v| v.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{CounterValue, MemUsage, TraceSummary};

    fn block(scale: u64, objects: &[(&str, i64)]) -> ResultsBlock {
        let trace = TraceSummary {
            seconds_to_init: Some(2.0 * scale as f64),
            syscalls: CounterMap::from([
                ("read".to_string(), CounterValue::Int(10 * scale as i64)),
                ("write".to_string(), CounterValue::Int(5)),
            ]),
            objects: objects
                .iter()
                .map(|(name, count)| (name.to_string(), CounterValue::Int(*count)))
                .collect(),
            packets: vec![(1.0, 3 * scale), (2.0, 7 * scale)],
            bytes: vec![(1.0, 1 << 29), (2.0, scale << 29)],
        };
        let perf = CounterMap::from([
            (DURATION_KEY.to_string(), CounterValue::Int(10_000_000_000 * scale as i64)),
            ("task-clock-msec".to_string(), CounterValue::Float(1500.5)),
        ]);
        let mem = MemUsage::from([(100, 0), (101, scale << 30), (102, 1 << 29)]);
        ResultsBlock::from_extracts(perf, trace, mem)
    }

    #[test]
    fn reduces_every_metric() {
        let (a, b) = (block(1, &[("Event", 40), ("Payload", 4)]), block(2, &[("Event", 60), ("Payload", 6)]));
        let merged = merge_results(&[&a, &b]).unwrap();

        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "mem_used_gib",
                "object_events",
                "object_payloads",
                "packets",
                "payload_gib",
                "perf_duration-time-sec",
                "perf_task-clock-msec",
                "seconds_post_init",
                "seconds_to_init",
                "syscalls",
            ]
        );

        assert_eq!(merged["packets"].min, 10.0);
        assert_eq!(merged["packets"].max, 20.0);
        assert_eq!(merged["payload_gib"].min, 1.0);
        assert_eq!(merged["payload_gib"].max, 1.5);
        assert_eq!(merged["mem_used_gib"].max, 2.0);
        assert_eq!(merged["mem_used_gib"].min, 1.0);
        assert_eq!(merged["object_events"].mean, 50.0);
        assert_eq!(merged["seconds_post_init"].min, 8.0);
        assert_eq!(merged["seconds_post_init"].max, 16.0);
        assert_eq!(merged["syscalls"].min, 15.0);
        assert_eq!(merged["perf_duration-time-sec"].max, 20.0);
        assert_eq!(merged["perf_task-clock-msec"].std, 0.0);

        for stats in merged.values() {
            assert_eq!(stats.count, 2);
            assert_eq!(stats.sum, None);
            assert!(stats.percentiles.is_empty());
        }
    }

    #[test]
    fn object_names_fall_back_across_variants() {
        let (a, b) = (block(1, &[("Event", 40), ("Payload", 4)]), block(1, &[("event_new", 60), ("payload_new", 6)]));
        let merged = merge_results(&[&a, &b]).unwrap();
        assert_eq!(merged["object_events"].min, 40.0);
        assert_eq!(merged["object_events"].max, 60.0);
        assert_eq!(merged["object_payloads"].max, 6.0);
    }

    #[test]
    fn missing_object_counter_is_fatal() {
        let (a, b) = (block(1, &[("Event", 40), ("Payload", 4)]), block(1, &[("Event", 40)]));
        let err = merge_results(&[&a, &b]).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingMetric { ref metric, .. } if metric == "object_payloads"));
    }

    #[test]
    fn missing_init_is_fatal() {
        let mut a = block(1, &[("Event", 1), ("Payload", 1)]);
        a.seconds_to_init = None;
        let err = merge_results(&[&a]).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingMetric { ref metric, .. } if metric == "seconds_to_init"));
    }

    #[test]
    fn perf_keys_come_from_first_trial() {
        let a = block(1, &[("Event", 1), ("Payload", 1)]);
        let mut b = block(1, &[("Event", 1), ("Payload", 1)]);
        b.perf.insert("cycles".to_string(), CounterValue::Int(5));
        assert!(!merge_results(&[&a, &b]).unwrap().contains_key("perf_cycles"));

        let err = merge_results(&[&b, &a]).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingMetric { ref metric, .. } if metric == "perf_cycles"));
    }
}
