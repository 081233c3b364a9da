//! Provider wire formats.
//!
//! Each provider behind the shared invocation endpoint speaks its own JSON
//! dialect. [`ProviderFormat`] is a closed enum over those dialects with an
//! exhaustive encode/decode pair, so adding a provider forces both sides to
//! be handled at compile time.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::ProviderError;

/// Decoded model reply: response text plus token usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Request/response dialect of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderFormat {
    /// Anthropic Messages API shape.
    Anthropic,
    /// Amazon Nova converse-style shape.
    Nova,
    /// Meta Llama raw-prompt shape.
    Llama,
    /// Mistral chat shape (temperature pinned at 0.7).
    Mistral,
    /// Plain OpenAI chat-completions shape (used by Qwen).
    OpenAiChat,
}

impl ProviderFormat {
    /// Build the request payload for a single user prompt.
    pub fn encode_payload(&self, prompt: &str, max_tokens: u32) -> Value {
        match self {
            Self::Anthropic => json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": max_tokens,
                "messages": [
                    {"role": "user", "content": prompt}
                ]
            }),
            Self::Nova => json!({
                "messages": [
                    {"role": "user", "content": [{"text": prompt}]}
                ],
                "inferenceConfig": {
                    "max_new_tokens": max_tokens
                }
            }),
            Self::Llama => json!({
                "prompt": prompt,
                "max_gen_len": max_tokens,
                "temperature": 0.7
            }),
            Self::Mistral => json!({
                "messages": [
                    {"role": "user", "content": prompt}
                ],
                "max_tokens": max_tokens,
                "temperature": 0.7
            }),
            Self::OpenAiChat => json!({
                "messages": [
                    {"role": "user", "content": prompt}
                ],
                "max_tokens": max_tokens
            }),
        }
    }

    /// Parse a provider response body into text and token usage.
    ///
    /// `prompt_chars` feeds the Llama token estimate (`chars / 4`) used when
    /// the response omits its token counts.
    pub fn decode_response(
        &self,
        body: &Value,
        prompt_chars: usize,
    ) -> Result<Decoded, ProviderError> {
        match self {
            Self::Anthropic => {
                let text = str_at(body, &["content", "0", "text"])?;
                Ok(Decoded {
                    input_tokens: u64_at(body, &["usage", "input_tokens"])?,
                    output_tokens: u64_at(body, &["usage", "output_tokens"])?,
                    text,
                })
            }
            Self::Nova => {
                let text = str_at(body, &["output", "message", "content", "0", "text"])?;
                Ok(Decoded {
                    input_tokens: u64_at(body, &["usage", "inputTokens"])?,
                    output_tokens: u64_at(body, &["usage", "outputTokens"])?,
                    text,
                })
            }
            Self::Llama => {
                let text = str_at(body, &["generation"])?;
                // Llama responses may omit token counts; fall back to a
                // rough 4-chars-per-token estimate.
                let input_tokens = u64_at(body, &["prompt_token_count"])
                    .unwrap_or((prompt_chars / 4) as u64);
                let output_tokens = u64_at(body, &["generation_token_count"])
                    .unwrap_or((text.chars().count() / 4) as u64);
                Ok(Decoded {
                    text,
                    input_tokens,
                    output_tokens,
                })
            }
            Self::Mistral | Self::OpenAiChat => {
                let text = str_at(body, &["choices", "0", "message", "content"])?;
                Ok(Decoded {
                    input_tokens: u64_at(body, &["usage", "prompt_tokens"])?,
                    output_tokens: u64_at(body, &["usage", "completion_tokens"])?,
                    text,
                })
            }
        }
    }
}

impl std::fmt::Display for ProviderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::Nova => write!(f, "nova"),
            Self::Llama => write!(f, "llama"),
            Self::Mistral => write!(f, "mistral"),
            Self::OpenAiChat => write!(f, "open-ai-chat"),
        }
    }
}

/// Walk a JSON path (object keys or array indices) and return the string leaf.
fn str_at(body: &Value, path: &[&str]) -> Result<String, ProviderError> {
    value_at(body, path)?
        .as_str()
        .map(String::from)
        .ok_or_else(|| ProviderError::UnexpectedShape(format!("expected string at {:?}", path)))
}

/// Walk a JSON path and return the unsigned-integer leaf.
fn u64_at(body: &Value, path: &[&str]) -> Result<u64, ProviderError> {
    value_at(body, path)?
        .as_u64()
        .ok_or_else(|| ProviderError::UnexpectedShape(format!("expected integer at {:?}", path)))
}

fn value_at<'a>(body: &'a Value, path: &[&str]) -> Result<&'a Value, ProviderError> {
    let mut cur = body;
    for seg in path {
        cur = match cur {
            Value::Array(arr) => seg.parse::<usize>().ok().and_then(|i| arr.get(i)),
            Value::Object(map) => map.get(*seg),
            _ => None,
        }
        .ok_or_else(|| ProviderError::UnexpectedShape(format!("missing field at {:?}", path)))?;
    }
    Ok(cur)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_payload_shape() {
        let p = ProviderFormat::Anthropic.encode_payload("hello", 4096);
        assert_eq!(p["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(p["max_tokens"], 4096);
        assert_eq!(p["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_nova_payload_nests_content_blocks() {
        let p = ProviderFormat::Nova.encode_payload("hi", 100);
        assert_eq!(p["messages"][0]["content"][0]["text"], "hi");
        assert_eq!(p["inferenceConfig"]["max_new_tokens"], 100);
    }

    #[test]
    fn test_llama_payload_uses_raw_prompt() {
        let p = ProviderFormat::Llama.encode_payload("hi", 256);
        assert_eq!(p["prompt"], "hi");
        assert_eq!(p["max_gen_len"], 256);
    }

    #[test]
    fn test_mistral_sets_temperature_openai_chat_does_not() {
        let m = ProviderFormat::Mistral.encode_payload("x", 10);
        let q = ProviderFormat::OpenAiChat.encode_payload("x", 10);
        assert!(m.get("temperature").is_some());
        assert!(q.get("temperature").is_none());
    }

    #[test]
    fn test_decode_anthropic() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "answer"}],
            "usage": {"input_tokens": 12, "output_tokens": 34}
        });
        let d = ProviderFormat::Anthropic.decode_response(&body, 0).unwrap();
        assert_eq!(d.text, "answer");
        assert_eq!(d.input_tokens, 12);
        assert_eq!(d.output_tokens, 34);
    }

    #[test]
    fn test_decode_nova() {
        let body = serde_json::json!({
            "output": {"message": {"content": [{"text": "nova says"}]}},
            "usage": {"inputTokens": 5, "outputTokens": 9}
        });
        let d = ProviderFormat::Nova.decode_response(&body, 0).unwrap();
        assert_eq!(d.text, "nova says");
        assert_eq!(d.output_tokens, 9);
    }

    #[test]
    fn test_decode_llama_with_counts() {
        let body = serde_json::json!({
            "generation": "llama out",
            "prompt_token_count": 40,
            "generation_token_count": 80
        });
        let d = ProviderFormat::Llama.decode_response(&body, 0).unwrap();
        assert_eq!(d.input_tokens, 40);
        assert_eq!(d.output_tokens, 80);
    }

    #[test]
    fn test_decode_llama_falls_back_to_estimate() {
        let body = serde_json::json!({"generation": "12345678"});
        let d = ProviderFormat::Llama.decode_response(&body, 100).unwrap();
        assert_eq!(d.input_tokens, 25); // 100 chars / 4
        assert_eq!(d.output_tokens, 2); // 8 chars / 4
    }

    #[test]
    fn test_decode_openai_chat() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "qwen out"}}],
            "usage": {"prompt_tokens": 7, "completion_tokens": 3}
        });
        let d = ProviderFormat::OpenAiChat.decode_response(&body, 0).unwrap();
        assert_eq!(d.text, "qwen out");
        assert_eq!(d.input_tokens, 7);
    }

    #[test]
    fn test_decode_missing_field_is_error() {
        let body = serde_json::json!({"usage": {}});
        let err = ProviderFormat::Anthropic.decode_response(&body, 0);
        assert!(matches!(err, Err(ProviderError::UnexpectedShape(_))));
    }

    #[test]
    fn test_format_serde_round_trip() {
        let s = serde_json::to_string(&ProviderFormat::OpenAiChat).unwrap();
        assert_eq!(s, "\"open-ai-chat\"");
        let f: ProviderFormat = serde_json::from_str(&s).unwrap();
        assert_eq!(f, ProviderFormat::OpenAiChat);
    }
}
