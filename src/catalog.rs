//! Built-in model and test-case catalogs.
//!
//! The model catalog maps stable keys to endpoint model IDs, display names
//! and per-1M-token pricing. Catalog order is load-bearing: rankings break
//! ties by first-seen catalog position, and the aggregator only accepts
//! records whose model key appears here (or in the user's config override).

use crate::config::schema::{ModelSpec, TestSpec};
use crate::providers::format::ProviderFormat;

/// Default model catalog: five lightweight models, pricing in USD per 1M
/// tokens as of Feb 2026. Some endpoint IDs use inference-profile prefixes.
pub fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec {
            key: "haiku-4.5".to_string(),
            id: "us.anthropic.claude-haiku-4-5-20251001-v1:0".to_string(),
            name: "Claude Haiku 4.5".to_string(),
            input_price: 1.00,
            output_price: 5.00,
            format: ProviderFormat::Anthropic,
        },
        ModelSpec {
            key: "qwen-3.2".to_string(),
            id: "qwen.qwen3-32b-v1:0".to_string(),
            name: "Qwen 3 32B".to_string(),
            input_price: 0.50,
            output_price: 1.50,
            format: ProviderFormat::OpenAiChat,
        },
        ModelSpec {
            key: "nova-2-lite".to_string(),
            id: "us.amazon.nova-2-lite-v1:0".to_string(),
            name: "Nova 2 Lite".to_string(),
            input_price: 0.06,
            output_price: 0.24,
            format: ProviderFormat::Nova,
        },
        ModelSpec {
            key: "llama-3.2-11b".to_string(),
            id: "us.meta.llama3-2-11b-instruct-v1:0".to_string(),
            name: "Llama 3.2 11B".to_string(),
            input_price: 0.16,
            output_price: 0.16,
            format: ProviderFormat::Llama,
        },
        ModelSpec {
            key: "ministral-8b".to_string(),
            id: "mistral.ministral-3-8b-instruct".to_string(),
            name: "Ministral 8B".to_string(),
            input_price: 0.10,
            output_price: 0.10,
            format: ProviderFormat::Mistral,
        },
    ]
}

/// Default test catalog. Every category is quality-tracked by default; the
/// prefix names the per-run judge result file (`{prefix}_results_run{i}.json`).
pub fn default_tests() -> Vec<TestSpec> {
    vec![
        TestSpec {
            name: "Complex Reasoning".to_string(),
            quality_prefix: Some("complex_reasoning".to_string()),
        },
        TestSpec {
            name: "Advanced Code Generation".to_string(),
            quality_prefix: Some("advanced_code_generation".to_string()),
        },
        TestSpec {
            name: "Multi-dimensional Analysis".to_string(),
            quality_prefix: Some("multi_dimensional_analysis".to_string()),
        },
        TestSpec {
            name: "Technical Translation".to_string(),
            quality_prefix: Some("technical_translation".to_string()),
        },
        TestSpec {
            name: "Technical Translation EN-KO".to_string(),
            quality_prefix: Some("technical_translation_en_ko".to_string()),
        },
    ]
}

/// Prompt for a named test category. Returns `None` for unknown names so the
/// suite can reject categories it has no scenario for.
pub fn prompt_for(test_name: &str) -> Option<&'static str> {
    match test_name {
        "Complex Reasoning" => Some(COMPLEX_REASONING),
        "Advanced Code Generation" => Some(ADVANCED_CODE_GENERATION),
        "Multi-dimensional Analysis" => Some(MULTI_DIMENSIONAL_ANALYSIS),
        "Technical Translation" => Some(TECHNICAL_TRANSLATION),
        "Technical Translation EN-KO" => Some(TECHNICAL_TRANSLATION_EN_KO),
        _ => None,
    }
}

const COMPLEX_REASONING: &str = "\
Analyze the following situation and propose a solution:

A global company is building a real-time collaboration platform with teams \
distributed across three continents (Asia, Europe, North America).
- Data-sovereignty regulations differ per region
- 500k average concurrent users, 2M at peak
- 99.99% availability requirement
- Latency must stay under 100ms
- Must integrate with 3 existing legacy systems

List the key architectural considerations in priority order, and for each \
one describe a concrete technology stack and implementation strategy.";

const ADVANCED_CODE_GENERATION: &str = "\
Write a Python class that satisfies the following requirements:

1. An LRU (Least Recently Used) cache with:
   - O(1) get/put operations
   - TTL (Time To Live) support with per-entry expiry
   - A memory usage limit in bytes
   - Statistics (hit rate, miss rate, eviction count)
   - Thread-safe implementation

2. Full type hints
3. Docstrings on the main methods
4. A short usage example";

const MULTI_DIMENSIONAL_ANALYSIS: &str = "\
Analyze the following business scenario from multiple angles:

An AI startup is considering a pivot to a B2B SaaS model.
Current situation:
- B2C today, 100k monthly active users, 95% on the free tier
- $400k annual revenue, $650k operating cost (running at a loss)
- 15 engineers, 5 marketers, 2 sales staff
- 3 major competitors already entrenched in the B2B market
- Needs to raise a Series A

Cover: (1) financial viability (break-even, expected CAC/LTV), \
(2) reorganization strategy, (3) product transition roadmap, \
(4) go-to-market strategy, (5) risk factors and mitigations.";

const TECHNICAL_TRANSLATION: &str = "\
Translate the following technical document into natural English while \
keeping the technical terms accurate:

\"분산 시스템에서 CAP 정리는 일관성(Consistency), 가용성(Availability), \
분할 내성(Partition Tolerance) 중 최대 2가지만 동시에 보장할 수 있다고 \
명시합니다. 실제 프로덕션 환경에서는 네트워크 분할이 불가피하므로, \
대부분의 시스템은 일관성과 가용성 사이에서 트레이드오프를 선택해야 합니다. \
이벤트 소싱과 CQRS 패턴을 활용하면 최종 일관성(Eventual Consistency)을 \
달성하면서도 높은 가용성을 유지할 수 있습니다. 다만, 이 경우 비즈니스 \
로직에서 일시적인 불일치 상태를 처리할 수 있는 보상 트랜잭션(Compensating \
Transaction) 메커니즘이 필요합니다.\"";

const TECHNICAL_TRANSLATION_EN_KO: &str = "\
Translate the following technical document into natural, fluent Korean \
while maintaining the accuracy of technical terms:

\"In modern cloud-native architectures, observability is achieved through \
three pillars: metrics, logs, and traces. Metrics provide quantitative \
measurements of system behavior over time, typically collected via \
time-series databases. Logs capture discrete events with contextual \
metadata, enabling post-hoc debugging through centralized platforms. \
Distributed tracing, implemented through standards like OpenTelemetry, \
correlates requests across microservice boundaries by propagating trace \
context headers. Together, these pillars enable SREs to define Service \
Level Objectives, set error budgets, and implement automated incident \
response workflows. The key challenge lies in balancing the cardinality of \
collected telemetry data against storage costs and query performance.\"";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models_have_unique_keys() {
        let models = default_models();
        let mut keys: Vec<&str> = models.iter().map(|m| m.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), models.len());
    }

    #[test]
    fn test_catalog_order_is_stable() {
        let models = default_models();
        assert_eq!(models[0].key, "haiku-4.5");
        assert_eq!(models[4].key, "ministral-8b");
    }

    #[test]
    fn test_every_default_test_has_a_prompt() {
        for test in default_tests() {
            assert!(
                prompt_for(&test.name).is_some(),
                "missing prompt for {}",
                test.name
            );
        }
    }

    #[test]
    fn test_unknown_test_has_no_prompt() {
        assert!(prompt_for("Nonexistent Scenario").is_none());
    }
}
