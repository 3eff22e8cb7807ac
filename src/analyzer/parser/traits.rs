use async_trait::async_trait;
use tree_sitter::{Query, QueryCursor, StreamingIterator};

use super::Language;
use crate::types::{ApiElement, DocSyncError, Result, SourceLocation};

/// Parser output: the API surface of one source file.
///
/// Nothing about the syntax tree leaks past this struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUnit {
    pub apis: Vec<ApiElement>,
    /// Module specifiers / paths this unit imports
    pub imports: Vec<String>,
    /// Names this unit exposes to other modules
    pub exports: Vec<String>,
}

/// Turns source text into an API surface.
///
/// `path` is only used for source locations and error messages.
#[async_trait]
pub trait ApiParser: Send + Sync {
    async fn parse(&self, path: &str, source: &str, language: Language) -> Result<ParsedUnit>;
}

/// Per-language tree-sitter extractor
pub trait LanguageParser: Send + Sync {
    fn parse(&self, path: &str, content: &str) -> Result<ParsedUnit>;
    fn language(&self) -> Language;
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// 1-based line span of a node
pub fn location_from_node(node: tree_sitter::Node, path: &str) -> SourceLocation {
    SourceLocation::new(
        path,
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

/// Create a tree-sitter parser for the given language.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| DocSyncError::Parse {
            message: format!("Failed to set {} language: {}", lang_name, e),
            path: String::new(),
        })?;
    Ok(parser)
}

/// Parse `content` and reject trees containing syntax errors
pub fn parse_tree(
    parser: &mut tree_sitter::Parser,
    path: &str,
    content: &str,
    lang_name: &str,
) -> Result<tree_sitter::Tree> {
    let tree = parser
        .parse(content, None)
        .ok_or_else(|| DocSyncError::parse(path, format!("Failed to parse {} file", lang_name)))?;

    if tree.root_node().has_error() {
        return Err(DocSyncError::parse(
            path,
            format!("{} source contains syntax errors", lang_name),
        ));
    }

    Ok(tree)
}

/// Header text of a declaration: everything before `cut` (body or initializer),
/// whitespace collapsed and trailing `=`, `:` or `;` removed.
pub fn signature_before(
    decl: tree_sitter::Node,
    cut: Option<tree_sitter::Node>,
    content: &[u8],
) -> String {
    let end = cut.map(|c| c.start_byte()).unwrap_or(decl.end_byte());
    let raw = content
        .get(decl.start_byte()..end)
        .and_then(|b| std::str::from_utf8(b).ok())
        .unwrap_or("");
    collapse_whitespace(raw)
        .trim_end_matches(['=', ':', ';', '{'])
        .trim_end()
        .to_string()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Execute a query and collect the text of every capture.
pub fn query_texts(
    language: &tree_sitter::Language,
    query_str: &str,
    root: tree_sitter::Node,
    content: &[u8],
) -> Vec<String> {
    let mut results = Vec::new();

    if let Ok(query) = Query::new(language, query_str) {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, content);

        while let Some(m) = matches.next() {
            for cap in m.captures.iter() {
                results.push(get_node_text(cap.node, content).to_string());
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("fn  foo(\n    a: i32,\n) -> u8"),
            "fn foo( a: i32, ) -> u8"
        );
    }

    #[test]
    fn test_parse_tree_rejects_syntax_errors() {
        let mut parser = create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust").unwrap();
        assert!(parse_tree(&mut parser, "ok.rs", "fn ok() {}", "Rust").is_ok());

        let err = parse_tree(&mut parser, "bad.rs", "fn broken( {", "Rust").unwrap_err();
        assert!(matches!(err, DocSyncError::Parse { ref path, .. } if path == "bad.rs"));
    }

    #[test]
    fn test_signature_before_body() {
        let mut parser = create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust").unwrap();
        let src = "pub fn add(a: i32,\n           b: i32) -> i32 { a + b }";
        let tree = parser.parse(src, None).unwrap();
        let func = tree.root_node().named_child(0).unwrap();
        let body = func.child_by_field_name("body");
        assert_eq!(
            signature_before(func, body, src.as_bytes()),
            "pub fn add(a: i32, b: i32) -> i32"
        );
    }
}
