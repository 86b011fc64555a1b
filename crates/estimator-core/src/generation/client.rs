//! OpenAI-compatible chat completion client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::prompt::{draft_messages, scope_messages, ChatMessage};
use super::sanitize::parse_draft_response;
use super::types::{DraftLineItem, DraftRequest, ScopeRequest};
use super::DraftGenerator;
use crate::error::{EstimatorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const DRAFT_MAX_TOKENS: u32 = 4000;
const DRAFT_TEMPERATURE: f32 = 0.3;
const SCOPE_MAX_TOKENS: u32 = 500;
const SCOPE_TEMPERATURE: f32 = 0.4;

/// Connection settings for [`OpenAiGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the first choice's text from a completion body.
fn completion_text(body: &str) -> Result<String> {
    let completion: ChatCompletionResponse = serde_json::from_str(body)?;
    Ok(completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default())
}

/// Draft and scope generator backed by a chat completions endpoint.
pub struct OpenAiGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl OpenAiGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(EstimatorError::UpstreamGeneration(
                "API key not configured".to_string(),
            ));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
        json_output: bool,
    ) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens,
            temperature,
            response_format: json_output.then(|| json!({ "type": "json_object" })),
        };

        debug!(%url, model = %self.config.model, "requesting completion");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "completion request failed");
            return Err(EstimatorError::UpstreamGeneration(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        completion_text(&body)
    }
}

impl DraftGenerator for OpenAiGenerator {
    fn draft_line_items(&self, request: &DraftRequest) -> Result<Vec<DraftLineItem>> {
        request.validate()?;
        let content = self.complete(
            &draft_messages(request),
            DRAFT_MAX_TOKENS,
            DRAFT_TEMPERATURE,
            true,
        )?;
        parse_draft_response(&content)
    }

    fn scope_text(&self, request: &ScopeRequest) -> Result<String> {
        request.validate()?;
        self.complete(
            &scope_messages(request),
            SCOPE_MAX_TOKENS,
            SCOPE_TEMPERATURE,
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_text_takes_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "  • Remove tile\n"}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;
        assert_eq!(completion_text(body).unwrap(), "• Remove tile");
    }

    #[test]
    fn test_completion_text_without_choices_is_empty() {
        assert_eq!(completion_text(r#"{"choices": []}"#).unwrap(), "");
        assert_eq!(
            completion_text(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap(),
            ""
        );
    }

    #[test]
    fn test_completion_text_rejects_garbage() {
        assert!(matches!(
            completion_text("<html>bad gateway</html>"),
            Err(EstimatorError::UpstreamGeneration(_))
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let result = OpenAiGenerator::new(GeneratorConfig::new("  "));
        assert!(matches!(result, Err(EstimatorError::UpstreamGeneration(_))));
    }

    #[test]
    fn test_request_serialization() {
        let messages = scope_messages(&ScopeRequest {
            item_name: "Tile".to_string(),
            ..Default::default()
        });
        let request = ChatCompletionRequest {
            model: "gpt-4o",
            messages: &messages,
            max_tokens: SCOPE_MAX_TOKENS,
            temperature: SCOPE_TEMPERATURE,
            response_format: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"model\":\"gpt-4o\""));
        assert!(!json.contains("response_format"));
    }
}
