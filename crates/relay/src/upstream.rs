use config::RelayConfig;
use reqwest::{Client, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::RelayError,
    messages::{ChatMessage, CompletionRequest},
};

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Substring the upstream puts into its error body when the prompt
/// exceeds the model's context window. Kept as a plain text match for
/// compatibility with the provider's free-text error format.
const CONTEXT_LENGTH_MARKER: &str = "context_length_exceeded";

/// Outcome of an upstream call that produced a response the relay
/// translates into HTTP 200.
pub(crate) enum UpstreamOutcome {
    /// Raw upstream success body, passed through byte for byte.
    Success(String),
    /// Upstream rejected the prompt as too long.
    ContextLengthExceeded,
}

/// Client for the upstream chat-completion API.
pub(crate) struct UpstreamClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
}

impl UpstreamClient {
    pub(crate) fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let Some(api_key) = config.api_key.clone() else {
            anyhow::bail!("relay.api_key is not configured");
        };

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for the upstream API: {e}"))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string());

        Ok(Self {
            client,
            base_url,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Forward the assembled message sequence to the upstream completion
    /// endpoint and classify the response.
    pub(crate) async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
    ) -> crate::Result<UpstreamOutcome> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            temperature: self.temperature,
        };

        log::debug!(
            "Forwarding {count} messages to {url} (model: {model}, max_tokens: {max_tokens})",
            count = request.messages.len(),
            model = request.model,
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key.expose_secret()))
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayError::Connection(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Upstream API error ({status}): {error_text}");

            if is_context_length_error(&error_text) {
                return Ok(UpstreamOutcome::ContextLengthExceeded);
            }

            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| RelayError::InvalidUpstreamResponse(e.to_string()))?;

        // Validate that the body is JSON before relaying it verbatim.
        if let Err(e) = sonic_rs::from_str::<serde_json::Value>(&response_text) {
            log::error!("Raw upstream response that failed to parse: {response_text}");
            return Err(RelayError::InvalidUpstreamResponse(e.to_string()));
        }

        log::debug!("Upstream response received successfully");

        Ok(UpstreamOutcome::Success(response_text))
    }
}

fn is_context_length_error(error_text: &str) -> bool {
    error_text.contains(CONTEXT_LENGTH_MARKER)
}

#[cfg(test)]
mod tests {
    use super::is_context_length_error;

    #[test]
    fn detects_context_length_marker_anywhere_in_the_body() {
        let body = r#"{"error":{"message":"This model's maximum context length is 4097 tokens.","code":"context_length_exceeded"}}"#;
        assert!(is_context_length_error(body));
    }

    #[test]
    fn other_error_bodies_are_not_matched() {
        assert!(!is_context_length_error(r#"{"error":{"code":"rate_limit_exceeded"}}"#));
        assert!(!is_context_length_error("Unknown error"));
    }
}
