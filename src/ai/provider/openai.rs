//! OpenAI API Provider
//!
//! Chat Completions with `response_format = json_object`. Works with any
//! OpenAI-compatible endpoint via `llm.api_base`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{LlmProvider, LlmResponse, ProviderConfig, TokenUsage};
use crate::ai::json::extract_json;
use crate::types::{DocSyncError, ErrorClassifier, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const SYSTEM_ROLE: &str = "You are a technical writer who keeps documentation accurate.";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                DocSyncError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var".to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocSyncError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base: config
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str, schema: &Value) -> ChatCompletionRequest {
        let system_content = if schema.is_null() {
            format!("{} Always respond with valid JSON.", SYSTEM_ROLE)
        } else {
            let schema_str = serde_json::to_string_pretty(schema).unwrap_or_else(|e| {
                warn!("Failed to pretty-print schema, using compact format: {}", e);
                schema.to_string()
            });
            format!(
                "{} Always respond with valid JSON matching this schema:\n\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
                SYSTEM_ROLE, schema_str
            )
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_content,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        info!(
            "Generating with OpenAI (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt, schema);
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| DocSyncError::LlmApi(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("OpenAI API error ({}): {}", status, body),
                "openai",
            )
            .into());
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| DocSyncError::LlmApi(format!("Failed to parse OpenAI response: {}", e)))?;

        let usage = body
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        let text = body
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| DocSyncError::LlmApi("No content in OpenAI response".to_string()))?;

        debug!("Received response from OpenAI, parsing JSON");
        Ok(LlmResponse {
            content: extract_json(text)?,
            usage,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(ProviderConfig {
            provider: "openai".to_string(),
            model: None,
            api_key: Some("sk-test".to_string()),
            api_base: Some("http://localhost:1234/v1/".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_defaults_and_redaction() {
        let p = provider();
        assert_eq!(p.model(), DEFAULT_MODEL);
        assert_eq!(p.api_base, "http://localhost:1234/v1");
        assert!(!format!("{:?}", p).contains("sk-test"));
    }

    #[test]
    fn test_request_embeds_schema() {
        let schema = json!({"type": "object", "required": ["updatedContent"]});
        let request = provider().build_request("Update the docs", &schema);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["messages"][0]["role"], "system");
        assert!(
            body["messages"][0]["content"]
                .as_str()
                .unwrap()
                .contains("updatedContent")
        );
        assert_eq!(body["messages"][1]["content"], "Update the docs");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_response_parsing() {
        let body: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "{\"reasoning\": \"ok\"}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }))
        .unwrap();
        assert_eq!(body.usage.unwrap().prompt_tokens, 10);
        assert!(body.choices[0].message.content.is_some());
    }
}
