//! Configuration schema for modelbench.
//!
//! All structs use `#[serde(rename_all = "camelCase")]` so that the JSON
//! config file can use camelCase keys while Rust code uses snake_case fields.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::providers::format::ProviderFormat;

/// One model in the benchmark catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    /// Stable key used in run documents and report maps (e.g. "haiku-4.5").
    pub key: String,
    /// Endpoint model ID.
    pub id: String,
    /// Display name for reports.
    pub name: String,
    /// USD per 1M input tokens.
    pub input_price: f64,
    /// USD per 1M output tokens.
    pub output_price: f64,
    /// Wire format for request payloads and response parsing.
    pub format: ProviderFormat,
}

impl ModelSpec {
    /// Cost in USD for one call, from token counts and catalog pricing.
    pub fn cost_usd(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_price;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_price;
        input_cost + output_cost
    }
}

/// One test category in the suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSpec {
    pub name: String,
    /// File-name prefix for the per-run judge result documents. `None` means
    /// the category is not quality-tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_prefix: Option<String>,
}

/// Endpoint configuration for model invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    /// Base URL of the bedrock-runtime-style HTTP endpoint.
    #[serde(default = "default_endpoint_base")]
    pub base_url: String,
    /// Bearer token for the endpoint.
    #[serde(default)]
    pub api_key: String,
    /// Model ID used for quality judging.
    #[serde(default = "default_judge_model")]
    pub judge_model: String,
}

fn default_endpoint_base() -> String {
    "https://bedrock-runtime.us-east-1.amazonaws.com".to_string()
}

fn default_judge_model() -> String {
    "us.anthropic.claude-opus-4-6-v1".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_endpoint_base(),
            api_key: String::new(),
            judge_model: default_judge_model(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Model catalog, in ranking tie-break order.
    #[serde(default = "catalog::default_models")]
    pub models: Vec<ModelSpec>,
    /// Test categories, in suite execution order.
    #[serde(default = "catalog::default_tests")]
    pub tests: Vec<TestSpec>,
    /// Number of trial runs the aggregator expects on disk.
    #[serde(default = "default_num_runs")]
    pub num_runs: u32,
    /// Output-token ceiling passed to every model. A record whose output
    /// token count reaches this value is counted as a possible truncation.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Directory holding run documents. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_dir: Option<PathBuf>,
}

fn default_num_runs() -> u32 {
    5
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: catalog::default_models(),
            tests: catalog::default_tests(),
            num_runs: default_num_runs(),
            max_tokens: default_max_tokens(),
            endpoint: EndpointConfig::default(),
            results_dir: None,
        }
    }
}

impl Config {
    /// Directory holding run documents.
    pub fn results_dir(&self) -> PathBuf {
        self.results_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Look up a model spec by catalog key.
    pub fn model(&self, key: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.key == key)
    }
}
