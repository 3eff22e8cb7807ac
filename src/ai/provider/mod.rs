//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for structured (JSON) output generation.
//! Providers perform a single attempt; retries live in the generator.

mod claude_code;
mod openai;

pub use claude_code::ClaudeCodeProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{DocSyncError, Result};

// =============================================================================
// LLM Response
// =============================================================================

/// LLM response: parsed JSON content plus usage for logging
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated content (structured JSON)
    pub content: Value,
    pub usage: TokenUsage,
    /// Wall clock time in milliseconds
    pub elapsed_ms: u64,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: Value) -> Self {
        Self {
            content,
            usage: TokenUsage::default(),
            elapsed_ms: 0,
        }
    }
}

/// Token usage as reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Shared LLM provider handle
pub type SharedProvider = Arc<dyn LlmProvider>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Runtime settings for one provider instance
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "claude-code" or "openai"
    pub provider: String,
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> usize {
    8192
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for ProviderConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: Some(config.model.clone()).filter(|m| !m.trim().is_empty()),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
            api_key: None,
            api_base: config.api_base.clone(),
            max_tokens: default_max_tokens(),
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate structured output matching `schema` (may be `Value::Null`)
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse>;

    /// Provider name for logging and error classification
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "claude-code" => Ok(Arc::new(ClaudeCodeProvider::new(config.clone()))),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        _ => Err(DocSyncError::Config(format!(
            "Unknown provider: {}. Supported: claude-code, openai",
            config.provider
        ))),
    }
}
