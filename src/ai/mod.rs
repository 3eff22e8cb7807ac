//! AI Integration Layer
//!
//! LLM providers, prompt construction and the documentation generator.

pub mod generator;
pub mod json;
pub mod prompt;
pub mod provider;

pub use generator::{DocGenerator, GeneratedDoc, GenerationContext, LlmDocGenerator};
pub use json::extract_json;
pub use prompt::PromptBuilder;
pub use provider::{
    ClaudeCodeProvider, LlmProvider, LlmResponse, OpenAiProvider, ProviderConfig, SharedProvider,
    TokenUsage, create_provider,
};
