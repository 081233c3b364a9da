//! Benchmark suite runner.
//!
//! Issues every test prompt to every catalog model sequentially, measures
//! wall-clock latency, derives cost from token counts and catalog pricing,
//! and persists one run document per pass (plus one judge document per
//! quality-tracked test). A failed invocation is stored as an error record
//! and the pass continues — aggregation later shrinks that pair's sample.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::aggregate::stats::round_to;
use crate::catalog;
use crate::config::schema::{Config, ModelSpec};
use crate::providers::invoker::ModelInvoker;
use crate::providers::judge;
use crate::record::{
    self, ModelMeta, Outcome, PerformanceRecord, Pricing, QualityDocument, QualityModelEntry,
    RunDocument, TestResult,
};

/// Pause between test categories, to stay clear of burst rate limits.
const INTER_TEST_DELAY: Duration = Duration::from_secs(1);

/// One successful model call before serialization.
#[derive(Debug, Clone)]
pub struct CallMetrics {
    pub latency_s: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub text: String,
}

impl CallMetrics {
    fn to_record(&self) -> PerformanceRecord {
        PerformanceRecord {
            latency_s: round_to(self.latency_s, 2),
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            cost_usd: round_to(self.cost_usd, 6),
            response_chars: self.text.chars().count() as u64,
        }
    }
}

/// Runs the full suite once and persists the resulting documents.
pub struct SuiteRunner {
    config: Config,
    invoker: Arc<dyn ModelInvoker>,
}

impl SuiteRunner {
    pub fn new(config: Config, invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { config, invoker }
    }

    /// Invoke one model with one prompt and measure it.
    pub async fn invoke_model(&self, spec: &ModelSpec, prompt: &str) -> Result<CallMetrics> {
        let payload = spec.format.encode_payload(prompt, self.config.max_tokens);

        let start = Instant::now();
        let body = self.invoker.invoke(&spec.id, &payload).await?;
        let latency_s = start.elapsed().as_secs_f64();

        let decoded = spec.format.decode_response(&body, prompt.chars().count())?;
        let cost_usd = spec.cost_usd(decoded.input_tokens, decoded.output_tokens);

        Ok(CallMetrics {
            latency_s,
            input_tokens: decoded.input_tokens,
            output_tokens: decoded.output_tokens,
            cost_usd,
            text: decoded.text,
        })
    }

    /// Execute one full pass (every test against every model) and write the
    /// run document and judge documents for run index `run_index` (1-based).
    /// Returns the path of the run document.
    pub async fn run(&self, run_index: u32) -> Result<PathBuf> {
        let dir = self.config.results_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create results dir {}", dir.display()))?;

        let mut doc = RunDocument {
            models: model_meta(&self.config),
            timestamp: Utc::now().to_rfc3339(),
            tests: Vec::new(),
        };

        let test_count = self.config.tests.len();
        for (idx, test) in self.config.tests.iter().enumerate() {
            let Some(prompt) = catalog::prompt_for(&test.name) else {
                bail!("No prompt defined for test category '{}'", test.name);
            };

            println!("\n{}", "=".repeat(60));
            println!("Test: {}", test.name);
            println!("{}", "=".repeat(60));

            let mut results = BTreeMap::new();
            let mut responses: BTreeMap<String, String> = BTreeMap::new();

            for spec in &self.config.models {
                println!("Testing {}...", spec.name);
                match self.invoke_model(spec, prompt).await {
                    Ok(metrics) => {
                        println!(
                            "  Done - {:.2}s, {} tokens, ${:.6}",
                            metrics.latency_s,
                            metrics.input_tokens + metrics.output_tokens,
                            metrics.cost_usd
                        );
                        responses.insert(spec.key.clone(), metrics.text.clone());
                        results.insert(spec.key.clone(), Outcome::Success(metrics.to_record()));
                    }
                    Err(e) => {
                        println!("  Failed - {}", e);
                        warn!("Model {} failed on '{}': {}", spec.key, test.name, e);
                        results.insert(
                            spec.key.clone(),
                            Outcome::Failure {
                                error: e.to_string(),
                            },
                        );
                    }
                }
            }

            print!("{}", format_comparison(&self.config, &test.name, &results));

            if let Some(prefix) = &test.quality_prefix {
                let quality = self
                    .judge_test(&test.name, prompt, &results, &responses)
                    .await;
                let path = record::quality_path(&dir, prefix, run_index);
                let json = serde_json::to_string_pretty(&quality)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Judge results saved: {}", path.display());
            }

            doc.tests.push(TestResult {
                test_name: test.name.clone(),
                results,
            });

            if idx + 1 < test_count {
                tokio::time::sleep(INTER_TEST_DELAY).await;
            }
        }

        let path = record::run_path(&dir, run_index);
        let json = serde_json::to_string_pretty(&doc)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\nResults saved: {}", path.display());

        Ok(path)
    }

    /// Judge every successful response for one test. Failed invocations get
    /// an error entry so the document stays complete per model.
    async fn judge_test(
        &self,
        test_name: &str,
        prompt: &str,
        results: &BTreeMap<String, Outcome>,
        responses: &BTreeMap<String, String>,
    ) -> QualityDocument {
        let mut models = BTreeMap::new();
        for spec in &self.config.models {
            let entry = match (results.get(&spec.key), responses.get(&spec.key)) {
                (Some(Outcome::Success(_)), Some(text)) => {
                    println!("  Evaluating {} with judge...", spec.name);
                    let outcome = judge::evaluate(
                        self.invoker.as_ref(),
                        &self.config.endpoint.judge_model,
                        prompt,
                        &spec.name,
                        text,
                    )
                    .await;
                    QualityModelEntry {
                        model_name: Some(spec.name.clone()),
                        response: Some(text.clone()),
                        quality_evaluation: Some(outcome),
                    }
                }
                _ => QualityModelEntry {
                    model_name: Some(spec.name.clone()),
                    response: None,
                    quality_evaluation: Some(crate::record::QualityOutcome::Other(
                        serde_json::json!({
                            "error": "Model invocation failed, skipping evaluation"
                        }),
                    )),
                },
            };
            models.insert(spec.key.clone(), entry);
        }
        QualityDocument {
            test_name: test_name.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            models,
        }
    }
}

fn model_meta(config: &Config) -> BTreeMap<String, ModelMeta> {
    config
        .models
        .iter()
        .map(|m| {
            (
                m.key.clone(),
                ModelMeta {
                    name: m.name.clone(),
                    model_id: m.id.clone(),
                    pricing: Pricing {
                        input: m.input_price,
                        output: m.output_price,
                    },
                },
            )
        })
        .collect()
}

/// Single-test comparison printout: latency, tokens, cost and response
/// length per successful model, with the fastest and cheapest called out.
pub fn format_comparison(
    config: &Config,
    test_name: &str,
    results: &BTreeMap<String, Outcome>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nComparison ({}):\n", test_name));

    // Successful records in catalog order.
    let successes: Vec<(&ModelSpec, &PerformanceRecord)> = config
        .models
        .iter()
        .filter_map(|m| {
            results
                .get(&m.key)
                .and_then(Outcome::as_success)
                .map(|r| (m, r))
        })
        .collect();

    if successes.is_empty() {
        out.push_str("  (no successful calls)\n");
        return out;
    }

    out.push_str("\nLatency:\n");
    for (m, r) in &successes {
        out.push_str(&format!("  {:20}: {:.2}s\n", m.name, r.latency_s));
    }

    out.push_str("\nToken Usage:\n");
    for (m, r) in &successes {
        out.push_str(&format!(
            "  {:20}: {} in + {} out = {} total\n",
            m.name,
            r.input_tokens,
            r.output_tokens,
            r.input_tokens + r.output_tokens
        ));
    }

    out.push_str("\nCost:\n");
    for (m, r) in &successes {
        out.push_str(&format!("  {:20}: ${:.6}\n", m.name, r.cost_usd));
    }

    out.push_str("\nResponse Length:\n");
    for (m, r) in &successes {
        out.push_str(&format!("  {:20}: {} chars\n", m.name, r.response_chars));
    }

    // A stable min: the first catalog entry wins ties.
    let fastest = successes
        .iter()
        .min_by(|a, b| a.1.latency_s.total_cmp(&b.1.latency_s))
        .map(|(m, _)| m.name.as_str())
        .unwrap_or("-");
    let cheapest = successes
        .iter()
        .min_by(|a, b| a.1.cost_usd.total_cmp(&b.1.cost_usd))
        .map(|(m, _)| m.name.as_str())
        .unwrap_or("-");
    out.push_str(&format!("\nFastest: {}\nCheapest: {}\n", fastest, cheapest));

    out
}
