//! Quality reducer.
//!
//! Collapses the judge verdicts for one (test, model) pair into averaged
//! sub-scores, a composite, and a verbatim per-run breakdown for audit.
//!
//! The composite is a two-level average: each retained run's composite is
//! the mean of its four sub-scores rounded to 1 decimal, and the pair's
//! composite is the mean of those rounded per-run composites. This differs
//! numerically from the flat mean of all individual scores whenever the
//! per-run rounding introduces drift, and the two-level form is the
//! contractual one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::stats::{mean, round_to};
use crate::config::schema::Config;
use crate::record::{EvaluationScores, RunSet};

/// One retained run's scores, kept verbatim plus its rounded composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunScore {
    pub accuracy: i64,
    pub specificity: i64,
    pub structure: i64,
    pub practicality: i64,
    pub avg: f64,
}

impl RunScore {
    fn from_scores(s: &EvaluationScores) -> Self {
        let avg = round_to(
            (s.accuracy + s.specificity + s.structure + s.practicality) as f64 / 4.0,
            1,
        );
        Self {
            accuracy: s.accuracy,
            specificity: s.specificity,
            structure: s.structure,
            practicality: s.practicality,
            avg,
        }
    }
}

/// Reduced quality view for one (test, model) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityStats {
    pub avg_accuracy: f64,
    pub avg_specificity: f64,
    pub avg_structure: f64,
    pub avg_practicality: f64,
    /// Mean of the rounded per-run composites, rounded to 1 decimal.
    pub avg_total: f64,
    /// Per-run breakdown in retained-run order.
    pub scores_per_run: Vec<RunScore>,
    /// One comment per retained run; empty strings are kept.
    pub comments: Vec<String>,
}

/// test name -> model key -> quality stats. Only quality-tracked tests
/// appear; models with zero valid verdicts are absent.
pub type QualitySummary = BTreeMap<String, BTreeMap<String, QualityStats>>;

/// Reduce judge verdicts for every quality-tracked test.
pub fn reduce(set: &RunSet, config: &Config) -> QualitySummary {
    let mut out = QualitySummary::new();
    for test_name in set.quality.keys() {
        let mut per_model = BTreeMap::new();
        for model in &config.models {
            if let Some(stats) = reduce_pair(set, test_name, &model.key) {
                per_model.insert(model.key.clone(), stats);
            }
        }
        out.insert(test_name.clone(), per_model);
    }
    out
}

/// Reduce one (test, model) pair, or `None` when no run has valid scores.
pub fn reduce_pair(set: &RunSet, test_name: &str, model_key: &str) -> Option<QualityStats> {
    let scores = set.scores_for(test_name, model_key);
    if scores.is_empty() {
        return None;
    }

    let per_run: Vec<RunScore> = scores.iter().map(|s| RunScore::from_scores(s)).collect();
    let composites: Vec<f64> = per_run.iter().map(|r| r.avg).collect();

    let sub = |f: fn(&EvaluationScores) -> i64| -> f64 {
        let values: Vec<f64> = scores.iter().map(|s| f(s) as f64).collect();
        round_to(mean(&values), 1)
    };

    Some(QualityStats {
        avg_accuracy: sub(|s| s.accuracy),
        avg_specificity: sub(|s| s.specificity),
        avg_structure: sub(|s| s.structure),
        avg_practicality: sub(|s| s.practicality),
        avg_total: round_to(mean(&composites), 1),
        scores_per_run: per_run,
        comments: scores.iter().map(|s| s.comment.clone()).collect(),
    })
}
