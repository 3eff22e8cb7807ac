//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Categories
//!
//! Provider failures are classified so the generator can decide whether a
//! request is worth retrying:
//!
//! - **Transient**: Temporary issues that may resolve (retry)
//! - **RateLimit**: API rate limiting (wait and retry)
//! - **Network**: Connectivity issues (retry with backoff)
//! - **Auth**: Authentication failures (fail fast)
//! - **Unavailable**: Provider unavailable (fail fast)
//!
//! Pipeline-level failures are plain [`DocSyncError`] values; the orchestrator
//! turns the recoverable ones into [`crate::agent::PhaseError`] records.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for LLM provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Context/token limit exceeded - retrying the same prompt is pointless
    TokenLimit,
    /// Authentication failed - fail fast
    Auth,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Provider unavailable - fail fast
    Unavailable,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Parsing LLM response failed - may succeed on retry
    ParseError,
    /// Temporary server issues - retry
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth retrying on the same provider
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::ParseError
        )
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Classified LLM error with retry hints
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Classifies raw provider error messages into categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("auth")
            || lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("unauthorized")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("503")
            || lower.contains("502")
            || lower.contains("500")
            || lower.contains("service unavailable")
            || lower.contains("overloaded")
        {
            return LlmError::with_provider(ErrorCategory::Transient, message, provider);
        }

        if lower.contains("not found")
            || lower.contains("not installed")
            || lower.contains("failed to spawn")
        {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        if lower.contains("400") || lower.contains("bad request") || lower.contains("malformed")
        {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        if lower.contains("parse") || lower.contains("json") || lower.contains("missing field") {
            return LlmError::with_provider(ErrorCategory::ParseError, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify an HTTP status code directly
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DocSyncError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // LLM Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Parse error in {path}: {message}")]
    Parse { message: String, path: String },

    #[error("Git error: {0}")]
    Git(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not initialized: run 'docsync init' first")]
    NotInitialized,

    #[error("Documentation generation failed for {path}: {reason}")]
    Generation { path: String, reason: String },

    #[error("Review failed: {0}")]
    Review(String),
}

impl From<LlmError> for DocSyncError {
    fn from(err: LlmError) -> Self {
        DocSyncError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, DocSyncError>;

impl DocSyncError {
    /// Create a parse error for a file
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Classify this error for retry decisions in the generator
    pub fn classify(&self, provider: &str) -> LlmError {
        match self {
            Self::Llm(err) => err.clone(),
            Self::LlmApi(msg) => ErrorClassifier::classify(msg, provider),
            Self::Json(_) => {
                LlmError::with_provider(ErrorCategory::ParseError, self.to_string(), provider)
            }
            Self::Io(_) => {
                LlmError::with_provider(ErrorCategory::Network, self.to_string(), provider)
            }
            Self::Config(_) => {
                LlmError::with_provider(ErrorCategory::BadRequest, self.to_string(), provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, self.to_string(), provider),
        }
    }

    /// Check if retrying the failed operation can help
    pub fn is_retryable(&self, provider: &str) -> bool {
        self.classify(provider).is_retryable()
    }
}

// =============================================================================
// Tests
// =============================================================================
