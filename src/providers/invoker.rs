//! Model invocation over HTTP.
//!
//! [`ModelInvoker`] abstracts the transport so the suite runner and the
//! judge client can be driven by a mock in tests. [`HttpInvoker`] speaks a
//! bedrock-runtime-style REST endpoint (`POST {base}/model/{id}/invoke`)
//! with bearer-token auth.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ProviderError;

/// Transport for raw model invocations: opaque JSON in, opaque JSON out.
/// Payload encoding and response decoding live in
/// [`ProviderFormat`](super::format::ProviderFormat).
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model_id: &str, payload: &Value) -> Result<Value, ProviderError>;
}

/// HTTP invoker with bearer-token auth.
pub struct HttpInvoker {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpInvoker {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ModelInvoker for HttpInvoker {
    async fn invoke(&self, model_id: &str, payload: &Value) -> Result<Value, ProviderError> {
        let url = format!("{}/model/{}/invoke", self.base_url, model_id);
        debug!("Invoking model {} at {}", model_id, self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let status = response.status();
        let retry_after_ms = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(|secs| secs * 1000)
            .unwrap_or(1000);

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::ResponseReadError(e.to_string()))?;

        if !status.is_success() {
            warn!("Model {} returned HTTP {}: {}", model_id, status, body);
            return Err(match status.as_u16() {
                429 => ProviderError::RateLimited {
                    status: 429,
                    retry_after_ms,
                },
                401 | 403 => ProviderError::AuthError {
                    status: status.as_u16(),
                    message: body,
                },
                s if s >= 500 => ProviderError::ServerError {
                    status: s,
                    message: body,
                },
                _ => ProviderError::HttpError(format!("HTTP {}: {}", status, body)),
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::JsonParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let inv = HttpInvoker::new("https://example.com/", "key");
        assert_eq!(inv.base_url, "https://example.com");
    }
}
