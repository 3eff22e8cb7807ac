//! Language Parser Module
//!
//! Tree-sitter based API extraction for TypeScript/JavaScript, Rust and Python.
//!
//! ## Parser Factory
//!
//! Use `create_parser` to create a parser for a given language:
//!
//! ```rust,ignore
//! use docsync::analyzer::parser::{Language, create_parser};
//!
//! let parser = create_parser(Language::Rust)?;
//! let unit = parser.parse("src/lib.rs", content)?;
//! ```

pub mod language;
pub mod python;
pub mod rust_lang;
pub mod traits;
pub mod typescript;

pub use language::Language;
pub use python::PythonParser;
pub use rust_lang::RustParser;
pub use traits::{ApiParser, LanguageParser, ParsedUnit, get_node_text};
pub use typescript::TypeScriptParser;

use async_trait::async_trait;
use tracing::debug;

use crate::types::{DocSyncError, Result};

/// Create a parser for the given language.
///
/// Returns an error if the language is not supported for parsing.
pub fn create_parser(language: Language) -> Result<Box<dyn LanguageParser>> {
    match language {
        Language::Rust => Ok(Box::new(RustParser::new()?)),
        Language::Python => Ok(Box::new(PythonParser::new()?)),
        Language::TypeScript | Language::JavaScript | Language::Tsx | Language::Jsx => {
            Ok(Box::new(TypeScriptParser::new(language)?))
        }
        _ => Err(DocSyncError::Parse {
            message: format!("No parser support for language: {}", language),
            path: String::new(),
        }),
    }
}

/// [`ApiParser`] backed by the tree-sitter grammars above
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterApiParser;

impl TreeSitterApiParser {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous variant used by the CLI `diff` command
    pub fn parse_sync(&self, path: &str, source: &str, language: Language) -> Result<ParsedUnit> {
        let parser = create_parser(language).map_err(|e| match e {
            DocSyncError::Parse { message, .. } => DocSyncError::parse(path, message),
            other => other,
        })?;
        let unit = parser.parse(path, source)?;
        debug!(
            "Parsed {} ({}): {} API element(s)",
            path,
            language,
            unit.apis.len()
        );
        Ok(unit)
    }
}

#[async_trait]
impl ApiParser for TreeSitterApiParser {
    async fn parse(&self, path: &str, source: &str, language: Language) -> Result<ParsedUnit> {
        self.parse_sync(path, source, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_parser() {
        assert_eq!(create_parser(Language::Rust).unwrap().language(), Language::Rust);
        assert_eq!(
            create_parser(Language::Jsx).unwrap().language(),
            Language::Jsx
        );
        assert!(create_parser(Language::Go).is_err());
    }

    #[tokio::test]
    async fn test_unsupported_language_names_the_file() {
        let err = TreeSitterApiParser::new()
            .parse("main.go", "package main", Language::Go)
            .await
            .unwrap_err();
        assert!(matches!(err, DocSyncError::Parse { ref path, .. } if path == "main.go"));
    }

    #[tokio::test]
    async fn test_dispatch_by_language() {
        let parser = TreeSitterApiParser::new();
        let unit = parser
            .parse("a.js", "export function hello(name) {}", Language::JavaScript)
            .await
            .unwrap();
        assert_eq!(unit.apis[0].name, "hello");
        assert_eq!(unit.apis[0].params()[0].name, "name");

        let unit = parser
            .parse("a.py", "def hello(name):\n    pass\n", Language::Python)
            .await
            .unwrap();
        assert_eq!(unit.apis[0].name, "hello");
    }
}
