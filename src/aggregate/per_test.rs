//! Per-test-per-model reducer.
//!
//! Collapses the trial records for one (test, model) pair into latency,
//! token, cost and response-length statistics. A pair with zero successful
//! records across all runs is absent from the output map — never a
//! zero-valued entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::stats::{mean, round_int, round_to, sample_stdev};
use crate::config::schema::Config;
use crate::record::RunSet;

/// Reduced statistics for one (test, model) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestModelStats {
    pub avg_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    /// 0 when fewer than two records survived.
    pub stdev_latency: f64,
    pub avg_input_tokens: u64,
    pub avg_output_tokens: u64,
    pub avg_cost: f64,
    pub avg_chars: u64,
    /// How many records saturated the output-token ceiling. A data-quality
    /// flag (possible truncation), not a failure.
    pub hit_limit_count: usize,
}

/// test name -> model key -> stats. Pairs without data are absent.
pub type PerTestSummary = BTreeMap<String, BTreeMap<String, TestModelStats>>;

/// Reduce every configured (test, model) pair.
pub fn reduce(set: &RunSet, config: &Config) -> PerTestSummary {
    let mut out = PerTestSummary::new();
    for test in &config.tests {
        let mut per_model = BTreeMap::new();
        for model in &config.models {
            if let Some(stats) = reduce_pair(set, config, &test.name, &model.key) {
                per_model.insert(model.key.clone(), stats);
            }
        }
        out.insert(test.name.clone(), per_model);
    }
    out
}

/// Reduce one (test, model) pair, or `None` when no run produced a record.
pub fn reduce_pair(
    set: &RunSet,
    config: &Config,
    test_name: &str,
    model_key: &str,
) -> Option<TestModelStats> {
    let records = set.records_for(test_name, model_key);
    if records.is_empty() {
        return None;
    }

    let latencies: Vec<f64> = records.iter().map(|r| r.latency_s).collect();
    let input_tokens: Vec<f64> = records.iter().map(|r| r.input_tokens as f64).collect();
    let output_tokens: Vec<f64> = records.iter().map(|r| r.output_tokens as f64).collect();
    let costs: Vec<f64> = records.iter().map(|r| r.cost_usd).collect();
    let chars: Vec<f64> = records.iter().map(|r| r.response_chars as f64).collect();

    let min_latency = latencies.iter().copied().fold(f64::INFINITY, f64::min);
    let max_latency = latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(TestModelStats {
        avg_latency: round_to(mean(&latencies), 2),
        min_latency: round_to(min_latency, 2),
        max_latency: round_to(max_latency, 2),
        stdev_latency: round_to(sample_stdev(&latencies), 2),
        avg_input_tokens: round_int(mean(&input_tokens)),
        avg_output_tokens: round_int(mean(&output_tokens)),
        avg_cost: round_to(mean(&costs), 6),
        avg_chars: round_int(mean(&chars)),
        hit_limit_count: records
            .iter()
            .filter(|r| r.output_tokens >= u64::from(config.max_tokens))
            .count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Outcome, PerformanceRecord, RunDocument, TestResult};

    fn record(latency: f64, output_tokens: u64) -> PerformanceRecord {
        PerformanceRecord {
            latency_s: latency,
            input_tokens: 100,
            output_tokens,
            cost_usd: 0.000010,
            response_chars: 500,
        }
    }

    fn run_with(test: &str, entries: &[(&str, Option<PerformanceRecord>)]) -> RunDocument {
        let mut results = BTreeMap::new();
        for (key, rec) in entries {
            let outcome = match rec {
                Some(r) => Outcome::Success(r.clone()),
                None => Outcome::Failure {
                    error: "timeout".to_string(),
                },
            };
            results.insert((*key).to_string(), outcome);
        }
        RunDocument {
            models: BTreeMap::new(),
            timestamp: String::new(),
            tests: vec![TestResult {
                test_name: test.to_string(),
                results,
            }],
        }
    }

    fn config_with_model(key: &str) -> Config {
        let mut config = Config::default();
        config.models.retain(|_| false);
        config.models.push(crate::config::schema::ModelSpec {
            key: key.to_string(),
            id: key.to_string(),
            name: key.to_string(),
            input_price: 1.0,
            output_price: 1.0,
            format: crate::providers::format::ProviderFormat::Anthropic,
        });
        config.tests = vec![crate::config::schema::TestSpec {
            name: "T1".to_string(),
            quality_prefix: None,
        }];
        config
    }

    #[test]
    fn test_stats_over_two_runs() {
        let set = RunSet {
            runs: vec![
                run_with("T1", &[("m", Some(record(1.0, 100)))]),
                run_with("T1", &[("m", Some(record(3.0, 100)))]),
            ],
            quality: BTreeMap::new(),
        };
        let config = config_with_model("m");
        let stats = reduce_pair(&set, &config, "T1", "m").unwrap();
        assert_eq!(stats.avg_latency, 2.0);
        assert_eq!(stats.min_latency, 1.0);
        assert_eq!(stats.max_latency, 3.0);
        // Sample stdev of {1, 3} = sqrt(2) ≈ 1.4142 → 1.41 at 2 dp.
        assert_eq!(stats.stdev_latency, 1.41);
        assert_eq!(stats.avg_output_tokens, 100);
    }

    #[test]
    fn test_single_run_has_zero_stdev() {
        let set = RunSet {
            runs: vec![run_with("T1", &[("m", Some(record(2.5, 10)))])],
            quality: BTreeMap::new(),
        };
        let config = config_with_model("m");
        let stats = reduce_pair(&set, &config, "T1", "m").unwrap();
        assert_eq!(stats.stdev_latency, 0.0);
    }

    #[test]
    fn test_failed_runs_shrink_the_sample() {
        let set = RunSet {
            runs: vec![
                run_with("T1", &[("m", Some(record(1.0, 10)))]),
                run_with("T1", &[("m", None)]),
                run_with("T1", &[("m", Some(record(2.0, 10)))]),
            ],
            quality: BTreeMap::new(),
        };
        let config = config_with_model("m");
        let stats = reduce_pair(&set, &config, "T1", "m").unwrap();
        // Two successful records, not three; the failure is not a zero.
        assert_eq!(stats.avg_latency, 1.5);
    }

    #[test]
    fn test_pair_with_no_records_is_absent() {
        let set = RunSet {
            runs: vec![run_with("T1", &[("m", None)]), run_with("T1", &[("m", None)])],
            quality: BTreeMap::new(),
        };
        let config = config_with_model("m");
        assert!(reduce_pair(&set, &config, "T1", "m").is_none());
        let summary = reduce(&set, &config);
        assert!(summary["T1"].is_empty());
    }

    #[test]
    fn test_ceiling_hit_boundary() {
        let set = RunSet {
            runs: vec![
                run_with("T1", &[("m", Some(record(1.0, 4096)))]),
                run_with("T1", &[("m", Some(record(1.0, 4095)))]),
            ],
            quality: BTreeMap::new(),
        };
        let config = config_with_model("m");
        let stats = reduce_pair(&set, &config, "T1", "m").unwrap();
        assert_eq!(stats.hit_limit_count, 1);
    }
}
