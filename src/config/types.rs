//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/docsync/) and project (.docsync/) level configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{ChangeSeverity, DocSyncError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Documentation and code roots
    pub paths: PathsConfig,

    /// Glob patterns (relative to the repository root) that are never scanned
    pub ignore: Vec<String>,

    /// Diffs below this severity are not synced
    pub min_severity: ChangeSeverity,

    /// Markup of the documentation corpus
    pub doc_format: DocFormat,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Review settings
    pub review: ReviewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathsConfig::default(),
            ignore: vec![
                "node_modules/**".to_string(),
                "target/**".to_string(),
                "dist/**".to_string(),
                ".git/**".to_string(),
            ],
            min_severity: ChangeSeverity::Patch,
            doc_format: DocFormat::Markdown,
            llm: LlmConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocSyncError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DocSyncError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(DocSyncError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.paths.docs.is_empty() {
            return Err(DocSyncError::Config(
                "paths.docs must name at least one documentation root".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Paths
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Documentation roots (files or directories)
    pub docs: Vec<String>,

    /// Source code roots watched for API changes
    pub code: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            docs: vec!["docs".to_string(), "README.md".to_string()],
            code: vec!["src".to_string()],
        }
    }
}

// =============================================================================
// Documentation Format
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    #[default]
    Markdown,
    #[serde(rename = "restructuredtext")]
    ReStructuredText,
    AsciiDoc,
    PlainText,
}

impl DocFormat {
    /// File extensions indexed for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Markdown => &["md", "mdx", "markdown"],
            Self::ReStructuredText => &["rst"],
            Self::AsciiDoc => &["adoc", "asciidoc"],
            Self::PlainText => &["txt"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::ReStructuredText => "restructuredtext",
            Self::AsciiDoc => "asciidoc",
            Self::PlainText => "plaintext",
        }
    }
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "restructuredtext" | "rst" => Ok(Self::ReStructuredText),
            "asciidoc" | "adoc" => Ok(Self::AsciiDoc),
            "plaintext" | "text" | "txt" => Ok(Self::PlainText),
            other => Err(format!("Unknown documentation format: {}", other)),
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (`claude-code` or `openai`)
    pub provider: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for LLM generation (0.0 = deterministic, 1.0 = creative)
    /// Default: 0.0 so repeated runs propose the same edits
    pub temperature: f32,

    /// Retries for transient failures, on top of the first attempt
    pub max_retries: u32,

    /// Override for OpenAI-compatible endpoints
    pub api_base: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "claude-code".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            timeout_secs: 300,
            temperature: 0.0,
            max_retries: 3,
            api_base: None,
        }
    }
}

// =============================================================================
// Review Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Approve every generated update without prompting
    pub auto_approve: bool,

    /// JSON array of review decisions, relative to the repository root
    pub decision_log: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            auto_approve: false,
            decision_log: ".docsync/decisions.json".to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "claude-code");
        assert_eq!(config.paths.docs, vec!["docs", "README.md"]);
        assert_eq!(config.min_severity, ChangeSeverity::Patch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.paths.docs.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_doc_format_extensions() {
        assert!(DocFormat::Markdown.extensions().contains(&"mdx"));
        assert_eq!(DocFormat::ReStructuredText.extensions(), &["rst"]);
        assert_eq!("adoc".parse::<DocFormat>(), Ok(DocFormat::AsciiDoc));
        assert!("docx".parse::<DocFormat>().is_err());
    }

    #[test]
    fn test_parse_from_toml() {
        let config: Config = toml::from_str(
            r#"
            min_severity = "major"
            doc_format = "restructuredtext"

            [paths]
            docs = ["manual"]
            "#,
        )
        .unwrap();
        assert_eq!(config.min_severity, ChangeSeverity::Major);
        assert_eq!(config.doc_format, DocFormat::ReStructuredText);
        assert_eq!(config.paths.docs, vec!["manual"]);
        assert_eq!(config.paths.code, vec!["src"]);
    }
}
