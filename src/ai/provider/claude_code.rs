//! Claude Code CLI Provider
//!
//! Runs the local `claude` CLI in print mode with a JSON schema.
//! Single-shot: retries are the generator's job.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use super::{LlmProvider, LlmResponse, ProviderConfig, TokenUsage};
use crate::ai::json::extract_json;
use crate::types::{DocSyncError, Result};

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

pub struct ClaudeCodeProvider {
    model: String,
    timeout_secs: u64,
    temperature: f32,
}

impl ClaudeCodeProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
        }
    }

    async fn execute(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        let start_time = Instant::now();

        let mut cmd = Command::new("claude");
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json")
            .arg("--model")
            .arg(&self.model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if !schema.is_null() {
            cmd.arg("--json-schema").arg(serde_json::to_string(schema)?);
        }

        cmd.env("CLAUDE_CODE_TEMPERATURE", self.temperature.to_string());

        let child = cmd.spawn().map_err(|e| {
            DocSyncError::LlmApi(format!(
                "Failed to spawn Claude Code CLI: {}. Is it installed?",
                e
            ))
        })?;

        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            DocSyncError::LlmApi(format!(
                "Claude Code timed out after {}s",
                self.timeout_secs
            ))
        })?
        .map_err(|e| DocSyncError::LlmApi(format!("Claude Code execution failed: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            if let Some(message) = api_error(&stdout) {
                return Err(DocSyncError::LlmApi(format!(
                    "Claude Code API error: {}",
                    message
                )));
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                "Process exited with non-zero status"
            } else {
                stderr.trim()
            };
            return Err(DocSyncError::LlmApi(format!(
                "Claude Code failed: {}",
                message
            )));
        }

        let response: Value = serde_json::from_str(&stdout).map_err(|e| {
            DocSyncError::LlmApi(format!("Failed to parse Claude Code output: {}", e))
        })?;

        if let Some(message) = api_error(&stdout) {
            return Err(DocSyncError::LlmApi(format!(
                "Claude Code API error: {}",
                message
            )));
        }

        let content = structured_content(&response)?;
        let usage = extract_usage(&response);
        debug!(
            "Claude Code responded ({} input / {} output tokens)",
            usage.input_tokens, usage.output_tokens
        );

        Ok(LlmResponse {
            content,
            usage,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

/// `result` text of an `is_error` envelope
fn api_error(stdout: &str) -> Option<String> {
    let response: Value = serde_json::from_str(stdout).ok()?;
    if !response.get("is_error").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    Some(
        response
            .get("result")
            .and_then(Value::as_str)
            .unwrap_or("Unknown API error")
            .to_string(),
    )
}

/// `structured_output` when the CLI honoured the schema, else the `result` text parsed as JSON
fn structured_content(response: &Value) -> Result<Value> {
    if let Some(structured) = response.get("structured_output") {
        return Ok(structured.clone());
    }

    match response.get("result") {
        Some(result) if result.is_object() || result.is_array() => Ok(result.clone()),
        Some(Value::String(text)) => extract_json(text),
        _ => Err(DocSyncError::LlmApi(
            "No structured_output in Claude Code response".to_string(),
        )),
    }
}

fn extract_usage(response: &Value) -> TokenUsage {
    let field = |name: &str| {
        response
            .get("usage")
            .and_then(|u| u.get(name))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    };

    TokenUsage {
        input_tokens: field("input_tokens"),
        output_tokens: field("output_tokens"),
    }
}

#[async_trait]
impl LlmProvider for ClaudeCodeProvider {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        info!(
            "Generating with Claude Code CLI (model: {}, temperature: {})",
            self.model, self.temperature
        );
        self.execute(prompt, schema).await
    }

    fn name(&self) -> &str {
        "claude-code"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_usage() {
        let response = json!({
            "usage": {
                "input_tokens": 1000,
                "output_tokens": 500,
                "cache_read_input_tokens": 100
            }
        });

        let usage = extract_usage(&response);
        assert_eq!(usage.input_tokens, 1000);
        assert_eq!(usage.output_tokens, 500);
        assert_eq!(usage.total(), 1500);
        assert_eq!(extract_usage(&json!({})), TokenUsage::default());
    }

    #[test]
    fn test_structured_content_prefers_structured_output() {
        let response = json!({
            "structured_output": {"updatedContent": "a", "reasoning": "b"},
            "result": "ignored"
        });
        assert_eq!(structured_content(&response).unwrap()["updatedContent"], "a");
    }

    #[test]
    fn test_structured_content_parses_result_text() {
        let response = json!({
            "result": "```json\n{\"updatedContent\": \"x\", \"reasoning\": \"y\"}\n```"
        });
        assert_eq!(structured_content(&response).unwrap()["reasoning"], "y");

        assert!(structured_content(&json!({"usage": {}})).is_err());
    }

    #[test]
    fn test_api_error_envelope() {
        let stdout = r#"{"is_error": true, "result": "Credit balance is too low"}"#;
        assert_eq!(api_error(stdout).as_deref(), Some("Credit balance is too low"));
        assert!(api_error(r#"{"is_error": false, "result": "{}"}"#).is_none());
        assert!(api_error("not json").is_none());
    }
}
