//! Documentation Generator
//!
//! Turns one affected [`DocFile`] plus the run's API diff into replacement
//! text. [`LlmDocGenerator`] retries retryable provider failures with
//! exponential backoff.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::prompt::{doc_update_prompt, relevant_changes};
use super::provider::SharedProvider;
use crate::config::DocFormat;
use crate::constants::retry::{BACKOFF_FACTOR, BASE_DELAY_MS, MAX_DELAY_SECS};
use crate::types::{
    ApiDiff, ChangeSeverity, DocFile, DocSyncError, ErrorCategory, LlmError, Result,
};

/// Everything about the run a generator may need besides the file itself
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    /// Merged diff of every file that survived the severity filter
    pub diff: &'a ApiDiff,
    pub severity: ChangeSeverity,
    pub doc_format: DocFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDoc {
    pub updated_content: String,
    #[serde(default)]
    pub reasoning: String,
}

#[async_trait]
pub trait DocGenerator: Send + Sync {
    async fn generate(&self, doc: &DocFile, context: &GenerationContext<'_>)
    -> Result<GeneratedDoc>;
}

fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "updatedContent": {
                "type": "string",
                "description": "The complete updated document"
            },
            "reasoning": {
                "type": "string",
                "description": "What was changed and why"
            }
        },
        "required": ["updatedContent", "reasoning"]
    })
}

/// LLM-backed generator
pub struct LlmDocGenerator {
    provider: SharedProvider,
    max_retries: u32,
    min_delay: Duration,
}

impl LlmDocGenerator {
    pub fn new(provider: SharedProvider, max_retries: u32) -> Self {
        Self {
            provider,
            max_retries,
            min_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }

    /// First backoff delay; later delays grow by the backoff factor
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    async fn attempt(&self, prompt: &str, schema: &Value) -> Result<GeneratedDoc> {
        let response = self.provider.generate(prompt, schema).await?;
        debug!(
            "{} returned {} tokens in {}ms",
            self.provider.name(),
            response.usage.total(),
            response.elapsed_ms
        );

        let generated: GeneratedDoc = serde_json::from_value(response.content).map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::ParseError,
                format!("Response does not match the update schema: {}", e),
                self.provider.name(),
            )
        })?;

        if generated.updated_content.trim().is_empty() {
            return Err(LlmError::with_provider(
                ErrorCategory::ParseError,
                "Response contained an empty document",
                self.provider.name(),
            )
            .into());
        }

        Ok(generated)
    }
}

#[async_trait]
impl DocGenerator for LlmDocGenerator {
    async fn generate(
        &self,
        doc: &DocFile,
        context: &GenerationContext<'_>,
    ) -> Result<GeneratedDoc> {
        let changes = relevant_changes(doc, context.diff);
        let prompt = doc_update_prompt(doc, &changes, context.severity, context.doc_format);
        let schema = response_schema();
        let provider = self.provider.name();

        info!(
            "Generating update for {} ({} relevant change(s)) with {}/{}",
            doc.path,
            changes.len(),
            provider,
            self.provider.model()
        );

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(Duration::from_secs(MAX_DELAY_SECS))
            .with_factor(BACKOFF_FACTOR)
            .with_max_times(self.max_retries as usize);

        (|| self.attempt(&prompt, &schema))
            .retry(backoff)
            .when(|e: &DocSyncError| e.is_retryable(provider))
            .notify(|e: &DocSyncError, delay: Duration| {
                warn!(
                    "Generation for {} failed ({}), retrying in {:?}",
                    doc.path, e, delay
                );
            })
            .await
            .map_err(|e| DocSyncError::Generation {
                path: doc.path.clone(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse};
    use crate::types::ApiElement;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails `failures` times with `error`, then answers `answer`
    struct ScriptedProvider {
        failures: usize,
        error: fn() -> DocSyncError,
        answer: Value,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(failures: usize, error: fn() -> DocSyncError, answer: Value) -> Arc<Self> {
            Arc::new(Self {
                failures,
                error,
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str, _schema: &Value) -> Result<LlmResponse> {
            assert!(prompt.contains("docs/api.md"));
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err((self.error)())
            } else {
                Ok(LlmResponse::content_only(self.answer.clone()))
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    fn answer() -> Value {
        json!({"updatedContent": "Call `foo(x)`.\n", "reasoning": "foo gained x"})
    }

    fn rate_limited() -> DocSyncError {
        DocSyncError::LlmApi("429 Too Many Requests".to_string())
    }

    fn unauthorized() -> DocSyncError {
        DocSyncError::LlmApi("401 Unauthorized: invalid api key".to_string())
    }

    async fn run(provider: Arc<ScriptedProvider>, max_retries: u32) -> Result<GeneratedDoc> {
        let diff = ApiDiff::all_added(vec![ApiElement::function("foo")]);
        let context = GenerationContext {
            diff: &diff,
            severity: ChangeSeverity::Major,
            doc_format: DocFormat::Markdown,
        };
        let doc = DocFile::new("docs/api.md", "Call `foo()`.\n");
        LlmDocGenerator::new(provider, max_retries)
            .with_min_delay(Duration::from_millis(1))
            .generate(&doc, &context)
            .await
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let provider = ScriptedProvider::new(0, rate_limited, answer());
        let generated = run(provider.clone(), 3).await.unwrap();
        assert_eq!(generated.updated_content, "Call `foo(x)`.\n");
        assert_eq!(generated.reasoning, "foo gained x");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retryable_failures_are_retried() {
        let provider = ScriptedProvider::new(2, rate_limited, answer());
        assert!(run(provider.clone(), 3).await.is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let provider = ScriptedProvider::new(10, rate_limited, answer());
        let err = run(provider.clone(), 2).await.unwrap_err();
        assert!(matches!(err, DocSyncError::Generation { ref path, .. } if path == "docs/api.md"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let provider = ScriptedProvider::new(10, unauthorized, answer());
        assert!(run(provider.clone(), 3).await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_retried_then_reported() {
        let provider = ScriptedProvider::new(0, rate_limited, json!({"content": "wrong key"}));
        let err = run(provider.clone(), 1).await.unwrap_err();
        assert!(err.to_string().contains("update schema"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
