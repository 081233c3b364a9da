//! Run-document data model and loading.
//!
//! One benchmark pass over the whole suite produces a
//! `comparison_results_run{i}.json` document, plus one
//! `{prefix}_results_run{i}.json` judge document per quality-tracked test.
//! [`RunSet`] materializes the full set of documents for aggregation; it is
//! immutable once loaded and every reducer borrows it.
//!
//! Document-level failures (missing file, unparsable JSON) are fatal — the
//! configured run count is a hard precondition. Record-level oddities are
//! tolerated: a model with a failed call carries an error record, a record
//! that matches neither shape is kept as `Other` and skipped by reducers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::schema::Config;
use crate::errors::AggregateError;

// ---------------------------------------------------------------------------
// Performance documents
// ---------------------------------------------------------------------------

/// Per-model pricing block written into run documents for traceability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default)]
    pub input: f64,
    #[serde(default)]
    pub output: f64,
}

/// Model metadata section of a run document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(rename = "pricing_per_1M_tokens", default)]
    pub pricing: Pricing,
}

/// One successful model call in one test of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub latency_s: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub response_chars: u64,
}

/// Result of one model call: success metrics, a stored failure, or an
/// unrecognized shape (skipped by every reducer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Success(PerformanceRecord),
    Failure { error: String },
    Other(Value),
}

impl Outcome {
    pub fn as_success(&self) -> Option<&PerformanceRecord> {
        match self {
            Outcome::Success(rec) => Some(rec),
            _ => None,
        }
    }
}

/// One test's results across all models in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub test_name: String,
    pub results: BTreeMap<String, Outcome>,
}

/// One complete benchmark pass: every test against every model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunDocument {
    #[serde(default)]
    pub models: BTreeMap<String, ModelMeta>,
    #[serde(default)]
    pub tests: Vec<TestResult>,
    /// ISO-8601 time the document was written. Informational only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
}

impl RunDocument {
    /// The successful record for a (test, model) pair, if the run has one.
    pub fn record_for(&self, test_name: &str, model_key: &str) -> Option<&PerformanceRecord> {
        self.tests
            .iter()
            .find(|t| t.test_name == test_name)
            .and_then(|t| t.results.get(model_key))
            .and_then(Outcome::as_success)
    }
}

// ---------------------------------------------------------------------------
// Quality documents
// ---------------------------------------------------------------------------

/// Four bounded sub-scores plus free-text commentary from the judge.
///
/// The contract says scores are integers in 1..=10, but only the lower
/// bound matters here; the aggregator never assumes the upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub accuracy: i64,
    pub specificity: i64,
    pub structure: i64,
    pub practicality: i64,
    #[serde(default)]
    pub comment: String,
}

/// Judge verdict for one model in one run: parsed scores, or whatever the
/// judge produced instead (error entries, raw text). Non-score shapes are
/// skipped by the quality reducer without shrinking other models' samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QualityOutcome {
    Scores(EvaluationScores),
    Other(Value),
}

impl QualityOutcome {
    pub fn as_scores(&self) -> Option<&EvaluationScores> {
        match self {
            QualityOutcome::Scores(s) => Some(s),
            _ => None,
        }
    }
}

/// Per-model entry of a judge document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityModelEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_evaluation: Option<QualityOutcome>,
}

/// One judge document: quality verdicts for every model on one test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityDocument {
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub models: BTreeMap<String, QualityModelEntry>,
    /// ISO-8601 time the document was written. Informational only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Paths and loading
// ---------------------------------------------------------------------------

/// Path of the performance document for run `i` (1-based).
pub fn run_path(dir: &Path, run_index: u32) -> PathBuf {
    dir.join(format!("comparison_results_run{}.json", run_index))
}

/// Path of the judge document for run `i` of a quality-tracked test.
pub fn quality_path(dir: &Path, prefix: &str, run_index: u32) -> PathBuf {
    dir.join(format!("{}_results_run{}.json", prefix, run_index))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AggregateError> {
    let contents = fs::read_to_string(path).map_err(|e| AggregateError::RunRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| AggregateError::RunParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// The immutable input to aggregation: all performance runs in order, plus
/// per-test judge runs for every quality-tracked category.
#[derive(Debug, Default)]
pub struct RunSet {
    pub runs: Vec<RunDocument>,
    /// test name -> judge documents in run order.
    pub quality: BTreeMap<String, Vec<QualityDocument>>,
}

impl RunSet {
    /// Load all documents named by the config. Any missing or unparsable
    /// file is fatal; the run count is not negotiable.
    pub fn load(config: &Config) -> Result<Self, AggregateError> {
        let dir = config.results_dir();

        let mut runs = Vec::with_capacity(config.num_runs as usize);
        for i in 1..=config.num_runs {
            runs.push(load_json::<RunDocument>(&run_path(&dir, i))?);
        }

        let mut quality = BTreeMap::new();
        for test in &config.tests {
            let Some(prefix) = &test.quality_prefix else {
                continue;
            };
            let mut docs = Vec::with_capacity(config.num_runs as usize);
            for i in 1..=config.num_runs {
                docs.push(load_json::<QualityDocument>(&quality_path(&dir, prefix, i))?);
            }
            quality.insert(test.name.clone(), docs);
        }

        let set = RunSet { runs, quality };
        set.warn_unknown_keys(config);
        Ok(set)
    }

    /// Log every model key that appears in the input but not in the
    /// configured catalog. Such records are skipped, never aggregated.
    fn warn_unknown_keys(&self, config: &Config) {
        for (run_idx, run) in self.runs.iter().enumerate() {
            for test in &run.tests {
                for key in test.results.keys() {
                    if config.model(key).is_none() {
                        warn!(
                            "Run {}: unknown model key '{}' in test '{}' — record skipped",
                            run_idx + 1,
                            key,
                            test.test_name
                        );
                    }
                }
            }
        }
        for (test_name, docs) in &self.quality {
            for (run_idx, doc) in docs.iter().enumerate() {
                for key in doc.models.keys() {
                    if config.model(key).is_none() {
                        warn!(
                            "Quality run {} of '{}': unknown model key '{}' — record skipped",
                            run_idx + 1,
                            test_name,
                            key
                        );
                    }
                }
            }
        }
    }

    /// Successful performance records for a (test, model) pair, in run order.
    pub fn records_for(&self, test_name: &str, model_key: &str) -> Vec<&PerformanceRecord> {
        self.runs
            .iter()
            .filter_map(|run| run.record_for(test_name, model_key))
            .collect()
    }

    /// Valid evaluation scores for a (test, model) pair, in run order.
    /// Records lacking the score fields are dropped entirely.
    pub fn scores_for(&self, test_name: &str, model_key: &str) -> Vec<&EvaluationScores> {
        self.quality
            .get(test_name)
            .map(|docs| {
                docs.iter()
                    .filter_map(|doc| doc.models.get(model_key))
                    .filter_map(|entry| entry.quality_evaluation.as_ref())
                    .filter_map(QualityOutcome::as_scores)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success_json() -> &'static str {
        r#"{
            "models": {"m-a": {"name": "Model A"}},
            "tests": [{
                "test_name": "T1",
                "results": {
                    "m-a": {"latency_s": 1.5, "input_tokens": 10, "output_tokens": 20,
                            "cost_usd": 0.000123, "response_chars": 80},
                    "m-b": {"error": "ThrottlingException"}
                }
            }]
        }"#
    }

    #[test]
    fn test_parse_success_and_error_outcomes() {
        let doc: RunDocument = serde_json::from_str(success_json()).unwrap();
        let rec = doc.record_for("T1", "m-a").unwrap();
        assert_eq!(rec.output_tokens, 20);
        assert!(doc.record_for("T1", "m-b").is_none());
        assert!(matches!(
            doc.tests[0].results["m-b"],
            Outcome::Failure { .. }
        ));
    }

    #[test]
    fn test_unrecognized_record_shape_becomes_other() {
        let json = r#"{"tests": [{"test_name": "T1", "results": {"m-a": {"latency_s": "oops"}}}]}"#;
        let doc: RunDocument = serde_json::from_str(json).unwrap();
        assert!(matches!(doc.tests[0].results["m-a"], Outcome::Other(_)));
        assert!(doc.record_for("T1", "m-a").is_none());
    }

    #[test]
    fn test_quality_outcome_missing_field_is_other() {
        let json = r#"{
            "models": {
                "m-a": {"quality_evaluation": {"accuracy": 8, "specificity": 7,
                        "structure": 9, "practicality": 8, "comment": "solid"}},
                "m-b": {"quality_evaluation": {"specificity": 7, "structure": 9,
                        "practicality": 8}},
                "m-c": {"quality_evaluation": {"error": "judge call failed"}}
            }
        }"#;
        let doc: QualityDocument = serde_json::from_str(json).unwrap();
        let a = doc.models["m-a"].quality_evaluation.as_ref().unwrap();
        assert_eq!(a.as_scores().unwrap().accuracy, 8);
        let b = doc.models["m-b"].quality_evaluation.as_ref().unwrap();
        assert!(b.as_scores().is_none());
        let c = doc.models["m-c"].quality_evaluation.as_ref().unwrap();
        assert!(c.as_scores().is_none());
    }

    #[test]
    fn test_comment_defaults_to_empty() {
        let json = r#"{"accuracy": 5, "specificity": 5, "structure": 5, "practicality": 5}"#;
        let s: EvaluationScores = serde_json::from_str(json).unwrap();
        assert_eq!(s.comment, "");
    }

    #[test]
    fn test_records_for_preserves_run_order() {
        let mut set = RunSet::default();
        for latency in [3.0, 1.0, 2.0] {
            let mut results = BTreeMap::new();
            results.insert(
                "m-a".to_string(),
                Outcome::Success(PerformanceRecord {
                    latency_s: latency,
                    input_tokens: 1,
                    output_tokens: 1,
                    cost_usd: 0.0,
                    response_chars: 1,
                }),
            );
            set.runs.push(RunDocument {
                models: BTreeMap::new(),
                timestamp: String::new(),
                tests: vec![TestResult {
                    test_name: "T1".to_string(),
                    results,
                }],
            });
        }
        let latencies: Vec<f64> = set
            .records_for("T1", "m-a")
            .iter()
            .map(|r| r.latency_s)
            .collect();
        assert_eq!(latencies, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.results_dir = Some(dir.path().to_path_buf());
        config.num_runs = 1;
        let err = RunSet::load(&config).unwrap_err();
        assert!(matches!(err, AggregateError::RunRead { .. }));
    }

    #[test]
    fn test_load_reads_quality_documents() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(run_path(dir.path(), 1), success_json()).unwrap();
        std::fs::write(
            quality_path(dir.path(), "t1", 1),
            r#"{"models": {"m-a": {"quality_evaluation": {"accuracy": 9,
                "specificity": 8, "structure": 9, "practicality": 7}}}}"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.results_dir = Some(dir.path().to_path_buf());
        config.num_runs = 1;
        config.tests = vec![crate::config::schema::TestSpec {
            name: "T1".to_string(),
            quality_prefix: Some("t1".to_string()),
        }];

        let set = RunSet::load(&config).unwrap();
        assert_eq!(set.runs.len(), 1);
        assert_eq!(set.scores_for("T1", "m-a").len(), 1);
        assert!(set.scores_for("T1", "m-b").is_empty());
    }
}
