//! Overall reducer.
//!
//! Collapses all tests into one summary per model. The reduction is
//! two-level by contract: each run is first collapsed to a single sample
//! (mean latency across its tests, total cost, mean combined tokens), and
//! only then are runs averaged. A flat average over all (test × run)
//! records would over-weight tests with more successful records; keeping
//! each run as one equally-weighted sample is the invariant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::stats::{mean, round_int, round_to, sample_stdev};
use crate::config::schema::Config;
use crate::record::{RunDocument, RunSet};

/// Cross-test summary for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    /// Mean of per-run mean latencies (2 dp).
    pub avg_latency: f64,
    /// Sample stdev of per-run mean latencies (2 dp, 0 when n <= 1).
    pub stdev_latency: f64,
    /// Mean of per-run total costs (6 dp). Cost accumulates within a run.
    pub avg_total_cost: f64,
    pub min_total_cost: f64,
    pub max_total_cost: f64,
    /// Mean of per-run mean combined (input+output) token counts.
    pub avg_tokens: u64,
}

/// model key -> overall stats. Models with zero records anywhere are absent.
pub type OverallSummary = BTreeMap<String, OverallStats>;

/// One run collapsed to a single sample for one model.
struct RunSample {
    mean_latency: f64,
    total_cost: f64,
    mean_tokens: f64,
}

fn collapse_run(run: &RunDocument, config: &Config, model_key: &str) -> Option<RunSample> {
    let mut latencies = Vec::new();
    let mut tokens = Vec::new();
    let mut total_cost = 0.0;

    for test in &config.tests {
        if let Some(rec) = run.record_for(&test.name, model_key) {
            latencies.push(rec.latency_s);
            tokens.push((rec.input_tokens + rec.output_tokens) as f64);
            total_cost += rec.cost_usd;
        }
    }

    if latencies.is_empty() {
        return None;
    }
    Some(RunSample {
        mean_latency: mean(&latencies),
        total_cost,
        mean_tokens: mean(&tokens),
    })
}

/// Reduce every configured model across all tests and runs.
pub fn reduce(set: &RunSet, config: &Config) -> OverallSummary {
    let mut out = OverallSummary::new();
    for model in &config.models {
        if let Some(stats) = reduce_model(set, config, &model.key) {
            out.insert(model.key.clone(), stats);
        }
    }
    out
}

/// Reduce one model, or `None` when no run has a single successful record.
pub fn reduce_model(set: &RunSet, config: &Config, model_key: &str) -> Option<OverallStats> {
    let samples: Vec<RunSample> = set
        .runs
        .iter()
        .filter_map(|run| collapse_run(run, config, model_key))
        .collect();
    if samples.is_empty() {
        return None;
    }

    let latencies: Vec<f64> = samples.iter().map(|s| s.mean_latency).collect();
    let costs: Vec<f64> = samples.iter().map(|s| s.total_cost).collect();
    let tokens: Vec<f64> = samples.iter().map(|s| s.mean_tokens).collect();

    let min_cost = costs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_cost = costs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(OverallStats {
        avg_latency: round_to(mean(&latencies), 2),
        stdev_latency: round_to(sample_stdev(&latencies), 2),
        avg_total_cost: round_to(mean(&costs), 6),
        min_total_cost: round_to(min_cost, 6),
        max_total_cost: round_to(max_cost, 6),
        avg_tokens: round_int(mean(&tokens)),
    })
}
