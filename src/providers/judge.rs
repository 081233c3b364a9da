//! Quality-judge client.
//!
//! Sends each model's response to a stronger judge model for scoring on
//! four criteria, then parses the judge's JSON verdict. The judge is a data
//! producer only: any failure here becomes an error entry in the quality
//! document, which the aggregator later skips.

use serde_json::json;
use tracing::{debug, warn};

use crate::errors::ProviderError;
use crate::providers::format::ProviderFormat;
use crate::providers::invoker::ModelInvoker;
use crate::record::QualityOutcome;

/// Max tokens for the judge's verdict — a JSON object plus one comment line.
const JUDGE_MAX_TOKENS: u32 = 300;

/// Build the scoring prompt for one model response.
pub fn build_eval_prompt(test_prompt: &str, model_name: &str, response: &str) -> String {
    format!(
        "You are an expert evaluator of AI model response quality. \
Evaluate the model's response to the prompt below.\n\n\
## Original prompt\n{test_prompt}\n\n\
## Model response ({model_name})\n{response}\n\n\
## Criteria\n\
Score each criterion from 1 to 10 and finish with a one-line comment.\n\
- Accuracy: factual and technical correctness\n\
- Specificity: concrete examples, numbers, implementation detail\n\
- Structure: logical organization and readability\n\
- Practicality: how directly applicable the answer is in practice\n\n\
## Output format (respond with exactly this JSON and nothing else)\n\
{{\"accuracy\": <score>, \"specificity\": <score>, \"structure\": <score>, \
\"practicality\": <score>, \"comment\": \"<one-line comment>\"}}"
    )
}

/// Extract the outermost `{ ... }` span from the judge's reply.
///
/// Judges occasionally wrap the JSON in prose; take everything from the
/// first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Score one model response with the judge model.
///
/// Never fails: invocation errors and unparsable verdicts are returned as
/// [`QualityOutcome::Other`] entries (`{"error": ...}` / `{"raw_response":
/// ...}`) so the run continues and the reducer skips them later.
pub async fn evaluate(
    invoker: &dyn ModelInvoker,
    judge_model: &str,
    test_prompt: &str,
    model_name: &str,
    response: &str,
) -> QualityOutcome {
    let prompt = build_eval_prompt(test_prompt, model_name, response);
    let payload = ProviderFormat::Anthropic.encode_payload(&prompt, JUDGE_MAX_TOKENS);

    let body = match invoker.invoke(judge_model, &payload).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Judge call failed for {}: {}", model_name, e);
            return QualityOutcome::Other(json!({ "error": e.to_string() }));
        }
    };

    let decoded = match ProviderFormat::Anthropic.decode_response(&body, prompt.chars().count()) {
        Ok(d) => d,
        Err(ProviderError::UnexpectedShape(msg)) => {
            warn!("Judge reply had unexpected shape for {}: {}", model_name, msg);
            return QualityOutcome::Other(json!({ "error": msg }));
        }
        Err(e) => return QualityOutcome::Other(json!({ "error": e.to_string() })),
    };

    match extract_json(&decoded.text).and_then(|span| serde_json::from_str(span).ok()) {
        Some(outcome) => {
            debug!("Judge scored {}", model_name);
            outcome
        }
        None => {
            warn!("Judge reply for {} was not valid score JSON", model_name);
            QualityOutcome::Other(json!({ "raw_response": decoded.text }))
        }
    }
}
