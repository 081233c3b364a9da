//! Report assembler.
//!
//! Merges the reducer outputs into one aggregate document and renders the
//! human-readable summary. Each aggregation invocation recomputes from
//! scratch; the document is a pure function of the run set and the config,
//! and serializing it twice over the same input is byte-identical.

use serde::{Deserialize, Serialize};

use crate::aggregate::overall::{self, OverallSummary};
use crate::aggregate::per_test::{self, PerTestSummary};
use crate::aggregate::quality::{self, QualitySummary};
use crate::aggregate::ranking::{rank_by, Direction, Ranked};
use crate::aggregate::throughput::{self, ThroughputSummary};
use crate::config::schema::Config;
use crate::record::RunSet;

/// The complete aggregate document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub num_runs: u32,
    pub overall: OverallSummary,
    pub quality_per_test: QualitySummary,
    pub throughput: ThroughputSummary,
    pub per_test: PerTestSummary,
}

impl AggregateReport {
    /// Machine-readable rendering.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Run every reducer over the set and merge the outputs.
pub fn assemble(set: &RunSet, config: &Config) -> AggregateReport {
    AggregateReport {
        num_runs: config.num_runs,
        overall: overall::reduce(set, config),
        quality_per_test: quality::reduce(set, config),
        throughput: throughput::reduce(set, config),
        per_test: per_test::reduce(set, config),
    }
}

/// Ranking entries in catalog order, so ties resolve to catalog position.
fn catalog_entries<F>(config: &Config, value_of: F) -> Vec<(String, f64)>
where
    F: Fn(&str) -> Option<f64>,
{
    config
        .models
        .iter()
        .filter_map(|m| value_of(&m.key).map(|v| (m.key.clone(), v)))
        .collect()
}

fn display_name<'a>(config: &'a Config, key: &'a str) -> &'a str {
    config.model(key).map(|m| m.name.as_str()).unwrap_or(key)
}

/// Human-readable summary: speed/cost/quality/throughput rankings plus
/// per-test detail tables.
pub fn render(report: &AggregateReport, config: &Config) -> String {
    let mut out = String::new();
    let bar = "=".repeat(70);

    out.push_str(&format!("{}\n", bar));
    out.push_str(&format!("AGGREGATED RESULTS ({} RUNS)\n", report.num_runs));
    out.push_str(&format!("{}\n", bar));

    out.push_str(&format!("\n### Overall Average ({} runs)\n", report.num_runs));

    let by_latency = rank_by(
        &catalog_entries(config, |k| report.overall.get(k).map(|o| o.avg_latency)),
        Direction::Ascending,
    );
    out.push_str("\nSpeed Ranking:\n");
    for Ranked { rank, key, .. } in &by_latency {
        let o = &report.overall[key];
        out.push_str(&format!(
            "  {}. {:20} | Avg: {:.2}s (±{:.2}s) | Tokens: {}\n",
            rank,
            display_name(config, key),
            o.avg_latency,
            o.stdev_latency,
            o.avg_tokens
        ));
    }

    let by_cost = rank_by(
        &catalog_entries(config, |k| report.overall.get(k).map(|o| o.avg_total_cost)),
        Direction::Ascending,
    );
    out.push_str("\nCost Ranking:\n");
    for Ranked { rank, key, .. } in &by_cost {
        let o = &report.overall[key];
        out.push_str(&format!(
            "  {}. {:20} | Avg: ${:.6} (min: ${:.6}, max: ${:.6})\n",
            rank,
            display_name(config, key),
            o.avg_total_cost,
            o.min_total_cost,
            o.max_total_cost
        ));
    }

    // Quality rankings per test, in catalog test order. Tests with no
    // quality data are omitted outright.
    for test in &config.tests {
        let Some(qa) = report.quality_per_test.get(&test.name) else {
            continue;
        };
        if qa.is_empty() {
            continue;
        }
        let by_quality = rank_by(
            &catalog_entries(config, |k| qa.get(k).map(|q| q.avg_total)),
            Direction::Descending,
        );
        out.push_str(&format!("\nQuality Ranking ({}):\n", test.name));
        for Ranked { rank, key, .. } in &by_quality {
            let q = &qa[key];
            let per_run: Vec<String> = q
                .scores_per_run
                .iter()
                .map(|s| format!("{:.1}", s.avg))
                .collect();
            out.push_str(&format!(
                "  {}. {:20} | Avg: {:.1} | Acc: {:.1} Spec: {:.1} Struct: {:.1} Prac: {:.1} | Per-run: [{}]\n",
                rank,
                display_name(config, key),
                q.avg_total,
                q.avg_accuracy,
                q.avg_specificity,
                q.avg_structure,
                q.avg_practicality,
                per_run.join(", ")
            ));
        }
    }

    let by_throughput = rank_by(
        &catalog_entries(config, |k| report.throughput.get(k).map(|t| t.average)),
        Direction::Descending,
    );
    out.push_str("\nThroughput (tok/s):\n");
    for Ranked { rank, key, value } in &by_throughput {
        out.push_str(&format!(
            "  {}. {:20} | Avg: {:.1} tok/s\n",
            rank,
            display_name(config, key),
            value
        ));
    }

    out.push_str("\n### Per-Test Details\n");
    for test in &config.tests {
        let Some(models) = report.per_test.get(&test.name) else {
            continue;
        };
        if models.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}:\n", test.name));
        let by_latency = rank_by(
            &catalog_entries(config, |k| models.get(k).map(|s| s.avg_latency)),
            Direction::Ascending,
        );
        for Ranked { key, .. } in &by_latency {
            let s = &models[key];
            let limit_flag = if s.hit_limit_count > 0 {
                format!(" [hit limit {}/{}]", s.hit_limit_count, report.num_runs)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {:20} | {:.2}s (±{:.2}) | Out: {} tok | ${:.6} | {} chars{}\n",
                display_name(config, key),
                s.avg_latency,
                s.stdev_latency,
                s.avg_output_tokens,
                s.avg_cost,
                s.avg_chars,
                limit_flag
            ));
        }
    }

    out
}
