//! Language Detection Module
//!
//! **Single source of truth** for language detection across the codebase.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docsync::analyzer::parser::Language;
//!
//! let lang = Language::from_path("src/main.rs");
//! assert_eq!(lang, Language::Rust);
//! assert!(lang.has_parser_support());
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Language Metadata Table - Single Source of Truth
// =============================================================================

/// Language metadata entry containing all language-specific information
struct LanguageMeta {
    /// Display name (human-readable)
    display_name: &'static str,
    /// Syntax highlighting identifier (lowercase, for markdown code blocks)
    highlight_str: &'static str,
    /// File extensions that map to this language
    extensions: &'static [&'static str],
    /// Alternative names for parsing from string
    aliases: &'static [&'static str],
    /// Whether the API parser understands this language
    has_parser: bool,
}

/// Macro to define language metadata concisely
macro_rules! lang_meta {
    ($display:literal, $highlight:literal, [$($ext:literal),*], [$($alias:literal),*], $parser:literal) => {
        LanguageMeta {
            display_name: $display,
            highlight_str: $highlight,
            extensions: &[$($ext),*],
            aliases: &[$($alias),*],
            has_parser: $parser,
        }
    };
}

impl Language {
    /// Get metadata for this language variant
    fn meta(&self) -> LanguageMeta {
        match self {
            Language::Rust => lang_meta!("Rust", "rust", ["rs"], ["rust"], true),
            Language::TypeScript => lang_meta!("TypeScript", "typescript", ["ts", "mts", "cts"], ["typescript", "ts"], true),
            Language::JavaScript => lang_meta!("JavaScript", "javascript", ["js", "mjs", "cjs"], ["javascript", "js"], true),
            Language::Tsx => lang_meta!("TSX", "tsx", ["tsx"], ["tsx"], true),
            Language::Jsx => lang_meta!("JSX", "jsx", ["jsx"], ["jsx"], true),
            Language::Python => lang_meta!("Python", "python", ["py", "pyi"], ["python", "py"], true),

            // Recognized so they can be reported, but not parsed
            Language::Go => lang_meta!("Go", "go", ["go"], ["go", "golang"], false),
            Language::Java => lang_meta!("Java", "java", ["java"], ["java"], false),
            Language::Kotlin => lang_meta!("Kotlin", "kotlin", ["kt", "kts"], ["kotlin", "kt"], false),
            Language::Ruby => lang_meta!("Ruby", "ruby", ["rb"], ["ruby", "rb"], false),
            Language::C => lang_meta!("C", "c", ["c", "h"], ["c"], false),
            Language::Cpp => lang_meta!("C++", "cpp", ["cpp", "cc", "cxx", "hpp"], ["cpp", "c++"], false),
            Language::Markdown => lang_meta!("Markdown", "markdown", ["md", "mdx", "markdown"], ["markdown", "md"], false),

            Language::Unknown => lang_meta!("Unknown", "text", [], ["unknown", "text", ""], false),
        }
    }
}

// =============================================================================
// Language Enum Definition
// =============================================================================

/// Programming languages known to change detection and the API parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    Rust,
    TypeScript,
    JavaScript,
    Tsx,
    Jsx,
    Python,
    Go,
    Java,
    Kotlin,
    Ruby,
    C,
    Cpp,
    Markdown,

    #[default]
    Unknown,
}

// =============================================================================
// Language Methods (using metadata table)
// =============================================================================

impl Language {
    /// Display name (human-readable)
    pub fn as_str(&self) -> &'static str {
        self.meta().display_name
    }

    /// Syntax highlighting identifier used in fenced code blocks
    pub fn highlight_str(&self) -> &'static str {
        self.meta().highlight_str
    }

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_lowercase();

        for lang in Self::all_variants() {
            if lang.meta().extensions.iter().any(|e| *e == ext_lower) {
                return *lang;
            }
        }

        Language::Unknown
    }

    /// Detect language from file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Check if the API parser supports this language
    pub fn has_parser_support(&self) -> bool {
        self.meta().has_parser
    }

    /// Extensions of every parser-supported language
    pub fn parseable_extensions() -> Vec<&'static str> {
        Self::all_variants()
            .iter()
            .filter(|l| l.has_parser_support())
            .flat_map(|l| l.meta().extensions.iter().copied())
            .collect()
    }

    /// Get all language variants for iteration
    fn all_variants() -> &'static [Language] {
        &[
            Language::Rust, Language::TypeScript, Language::JavaScript,
            Language::Tsx, Language::Jsx, Language::Python, Language::Go,
            Language::Java, Language::Kotlin, Language::Ruby, Language::C,
            Language::Cpp, Language::Markdown,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_lower = s.to_lowercase();

        for lang in Self::all_variants() {
            if lang.meta().aliases.iter().any(|a| *a == s_lower) {
                return Ok(*lang);
            }
        }

        if s_lower.is_empty() || s_lower == "unknown" || s_lower == "text" {
            return Ok(Language::Unknown);
        }

        Err(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("RS"), Language::Rust);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("tsx"), Language::Tsx);
        assert_eq!(Language::from_extension("mjs"), Language::JavaScript);
        assert_eq!(Language::from_extension("unknown"), Language::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("src/main.rs"), Language::Rust);
        assert_eq!(Language::from_path("no_extension"), Language::Unknown);
        assert_eq!(Language::from_path("Component.tsx"), Language::Tsx);
    }

    #[test]
    fn test_has_parser_support() {
        assert!(Language::Rust.has_parser_support());
        assert!(Language::Python.has_parser_support());
        assert!(Language::Jsx.has_parser_support());
        assert!(!Language::Go.has_parser_support());
        assert!(!Language::Unknown.has_parser_support());
    }

    #[test]
    fn test_parseable_extensions() {
        let exts = Language::parseable_extensions();
        assert!(exts.contains(&"ts"));
        assert!(exts.contains(&"py"));
        assert!(!exts.contains(&"go"));
        assert!(!exts.contains(&"md"));
    }

    #[test]
    fn test_from_str_and_display() {
        assert_eq!("RUST".parse::<Language>(), Ok(Language::Rust));
        assert_eq!("c++".parse::<Language>(), Ok(Language::Cpp));
        assert_eq!("invalid_lang_xyz".parse::<Language>(), Err(()));
        assert_eq!(format!("{}", Language::Cpp), "C++");
        assert_eq!(Language::Unknown.highlight_str(), "text");
    }
}
