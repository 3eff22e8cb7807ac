use super::traits::{
    LanguageParser, ParsedUnit, create_ts_parser, get_node_text, location_from_node, parse_tree,
    query_texts, signature_before,
};
use super::Language;
use crate::types::{ApiElement, ApiKind, Parameter, Result};

pub struct RustParser;

impl RustParser {
    pub fn new() -> Result<Self> {
        // Validate parser creation at construction time
        let _ = create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust")?;
        Ok(Self)
    }
}

impl LanguageParser for RustParser {
    fn parse(&self, path: &str, content: &str) -> Result<ParsedUnit> {
        let mut parser = create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust")?;
        let tree = parse_tree(&mut parser, path, content, "Rust")?;
        let root = tree.root_node();
        let bytes = content.as_bytes();

        let mut unit = ParsedUnit {
            imports: extract_use_statements(root, bytes),
            ..Default::default()
        };

        let mut cursor = root.walk();
        for item in root.named_children(&mut cursor) {
            if let Some(element) = extract_item(item, bytes, path) {
                if element.is_public {
                    unit.exports.push(element.name.clone());
                }
                unit.apis.push(element);
            }
        }

        Ok(unit)
    }

    fn language(&self) -> Language {
        Language::Rust
    }
}

fn extract_use_statements(root: tree_sitter::Node, content: &[u8]) -> Vec<String> {
    let query_str = r#"
        (source_file
            (use_declaration
                argument: (_) @path
            )
        )
    "#;

    query_texts(&tree_sitter_rust::LANGUAGE.into(), query_str, root, content)
}

fn extract_item(item: tree_sitter::Node, content: &[u8], path: &str) -> Option<ApiElement> {
    let (kind, cut_field) = match item.kind() {
        "function_item" | "function_signature_item" => (ApiKind::Function, Some("body")),
        "struct_item" => (ApiKind::Class, Some("body")),
        "enum_item" => (ApiKind::Type, Some("body")),
        "trait_item" => (ApiKind::Interface, Some("body")),
        "type_item" => (ApiKind::Type, None),
        "const_item" | "static_item" => (ApiKind::Constant, Some("value")),
        _ => return None,
    };

    let name_node = item.child_by_field_name("name")?;
    let cut = cut_field.and_then(|f| item.child_by_field_name(f));

    let mut element = ApiElement::new(kind, get_node_text(name_node, content))
        .with_signature(signature_before(item, cut, content))
        .with_public(is_exactly_pub(item, content))
        .with_location(location_from_node(item, path));

    if kind == ApiKind::Function {
        if let Some(params) = item.child_by_field_name("parameters") {
            element = element.with_parameters(extract_parameters(params, content));
        }
        if let Some(ret) = item.child_by_field_name("return_type") {
            element = element.with_return_type(get_node_text(ret, content));
        }
    }

    if let Some(doc) = doc_comments_before(item, content) {
        element = element.with_documentation(doc);
    }

    Some(element)
}

/// `pub(crate)`, `pub(super)` and friends are not part of the public API
fn is_exactly_pub(item: tree_sitter::Node, content: &[u8]) -> bool {
    let mut cursor = item.walk();
    let result = item
        .children(&mut cursor)
        .find(|c| c.kind() == "visibility_modifier")
        .map(|v| get_node_text(v, content).trim() == "pub")
        .unwrap_or(false);
    result
}

fn extract_parameters(params: tree_sitter::Node, content: &[u8]) -> Vec<Parameter> {
    let mut result = Vec::new();
    let mut cursor = params.walk();

    for param in params.named_children(&mut cursor) {
        if param.kind() != "parameter" {
            continue;
        }
        let name = param
            .child_by_field_name("pattern")
            .map(|p| get_node_text(p, content))
            .unwrap_or_default();
        let mut p = Parameter::new(name);
        if let Some(ty) = param.child_by_field_name("type") {
            p = p.with_type(get_node_text(ty, content));
        }
        result.push(p);
    }

    result
}

/// Contiguous `///` lines above the item; attributes in between are skipped
fn doc_comments_before(item: tree_sitter::Node, content: &[u8]) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = item.prev_named_sibling();
    let mut expected_row = item.start_position().row;

    while let Some(node) = current {
        if node.end_position().row + 1 < expected_row {
            break;
        }
        match node.kind() {
            "attribute_item" => {}
            "line_comment" => {
                let text = get_node_text(node, content);
                if !text.starts_with("///") || text.starts_with("////") {
                    break;
                }
                lines.push(text.trim_start_matches("///").trim().to_string());
            }
            _ => break,
        }
        expected_row = node.start_position().row;
        current = node.prev_named_sibling();
    }

    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ParsedUnit {
        RustParser::new().unwrap().parse("src/lib.rs", src).unwrap()
    }

    fn find<'a>(unit: &'a ParsedUnit, name: &str) -> &'a ApiElement {
        unit.apis.iter().find(|a| a.name == name).unwrap()
    }

    #[test]
    fn test_public_function_with_docs() {
        let unit = parse(
            r#"
use std::collections::HashMap;

/// Adds two numbers.
///
/// Saturates on overflow.
#[inline]
pub fn add(a: u32, b: u32) -> u32 {
    a.saturating_add(b)
}

pub(crate) fn internal() {}
fn private() {}
"#,
        );

        assert_eq!(unit.imports, vec!["std::collections::HashMap"]);
        assert_eq!(unit.exports, vec!["add"]);

        let add = find(&unit, "add");
        assert_eq!(add.kind, ApiKind::Function);
        assert!(add.is_public);
        assert_eq!(add.signature, "pub fn add(a: u32, b: u32) -> u32");
        assert_eq!(add.return_type.as_deref(), Some("u32"));
        assert_eq!(
            add.documentation.as_deref(),
            Some("Adds two numbers.\n\nSaturates on overflow.")
        );
        assert_eq!(add.params().len(), 2);
        assert_eq!(add.params()[1].param_type.as_deref(), Some("u32"));

        assert!(!find(&unit, "internal").is_public);
        assert!(!find(&unit, "private").is_public);
    }

    #[test]
    fn test_item_kinds() {
        let unit = parse(
            r#"
pub struct Config { pub name: String }
pub enum Mode { Fast, Slow }
pub trait Store { fn get(&self) -> u8; }
pub type Id = u64;
pub const MAX: usize = 10;
pub static NAME: &str = "x";
"#,
        );

        assert_eq!(find(&unit, "Config").kind, ApiKind::Class);
        assert_eq!(find(&unit, "Config").signature, "pub struct Config");
        assert_eq!(find(&unit, "Mode").kind, ApiKind::Type);
        assert_eq!(find(&unit, "Store").kind, ApiKind::Interface);
        assert_eq!(find(&unit, "Id").signature, "pub type Id = u64");
        assert_eq!(find(&unit, "MAX").kind, ApiKind::Constant);
        assert_eq!(find(&unit, "MAX").signature, "pub const MAX: usize");
        assert_eq!(find(&unit, "NAME").kind, ApiKind::Constant);
        assert_eq!(unit.apis.len(), 6);
    }

    #[test]
    fn test_self_parameter_is_skipped() {
        let unit = parse("pub fn touch(self, n: i32) {}");
        let params = find(&unit, "touch").params();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "n");
    }

    #[test]
    fn test_regular_comment_is_not_documentation() {
        let unit = parse("// note\npub fn f() {}");
        assert!(find(&unit, "f").documentation.is_none());
    }

    #[test]
    fn test_syntax_error() {
        assert!(RustParser::new().unwrap().parse("bad.rs", "pub fn (").is_err());
    }
}
