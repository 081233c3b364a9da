//! Throughput deriver.
//!
//! Output tokens per second, derived per record and then averaged — first
//! within a test, then across tests. The per-model `average` is a mean of
//! the per-test means, not a re-derivation from raw totals; the two differ
//! whenever test-level record counts vary, and the mean-of-means form is
//! the one reported (each test weighs equally).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregate::stats::{mean, round_to};
use crate::config::schema::Config;
use crate::record::RunSet;

/// Per-model throughput: one figure per test plus the across-test average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputStats {
    /// test name -> mean output tokens/sec over that test's records (1 dp).
    #[serde(flatten)]
    pub per_test: BTreeMap<String, f64>,
    /// Mean of the per-test figures (1 dp).
    pub average: f64,
}

/// model key -> throughput stats. Models with no valid records are absent.
pub type ThroughputSummary = BTreeMap<String, ThroughputStats>;

/// Derive throughput for every configured model.
pub fn reduce(set: &RunSet, config: &Config) -> ThroughputSummary {
    let mut out = ThroughputSummary::new();
    for model in &config.models {
        let mut per_test = BTreeMap::new();
        for test in &config.tests {
            if let Some(tp) = reduce_pair(set, &test.name, &model.key) {
                per_test.insert(test.name.clone(), tp);
            }
        }
        if per_test.is_empty() {
            continue;
        }
        let figures: Vec<f64> = per_test.values().copied().collect();
        out.insert(
            model.key.clone(),
            ThroughputStats {
                average: round_to(mean(&figures), 1),
                per_test,
            },
        );
    }
    out
}

/// Mean tokens/sec for one (test, model) pair, or `None` without valid
/// records. Records with non-positive latency are a contract violation and
/// are excluded with a warning rather than silently producing infinity.
pub fn reduce_pair(set: &RunSet, test_name: &str, model_key: &str) -> Option<f64> {
    let mut rates = Vec::new();
    for record in set.records_for(test_name, model_key) {
        if record.latency_s <= 0.0 {
            warn!(
                "Record for ({}, {}) has non-positive latency {}s — excluded from throughput",
                test_name, model_key, record.latency_s
            );
            continue;
        }
        rates.push(record.output_tokens as f64 / record.latency_s);
    }
    if rates.is_empty() {
        None
    } else {
        Some(round_to(mean(&rates), 1))
    }
}
