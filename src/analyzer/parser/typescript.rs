use std::collections::HashSet;

use super::traits::{
    LanguageParser, ParsedUnit, create_ts_parser, get_node_text, location_from_node, parse_tree,
    query_texts, signature_before,
};
use super::Language;
use crate::types::{ApiElement, ApiKind, Parameter, Result};

/// Parser for TypeScript, JavaScript, TSX and JSX.
///
/// Plain JavaScript is parsed with the TypeScript grammar; JSX variants use
/// the TSX grammar.
pub struct TypeScriptParser {
    language: Language,
}

impl TypeScriptParser {
    pub fn new(language: Language) -> Result<Self> {
        // Fail early if the grammar cannot be loaded
        create_ts_parser(Self::grammar_for(language), "TypeScript")?;
        Ok(Self { language })
    }

    fn grammar_for(language: Language) -> tree_sitter::Language {
        match language {
            Language::Tsx | Language::Jsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }
}

impl LanguageParser for TypeScriptParser {
    fn parse(&self, path: &str, content: &str) -> Result<ParsedUnit> {
        let grammar = Self::grammar_for(self.language);
        let mut parser = create_ts_parser(grammar.clone(), self.language.as_str())?;
        let tree = parse_tree(&mut parser, path, content, self.language.as_str())?;
        let root = tree.root_node();
        let bytes = content.as_bytes();

        let mut unit = ParsedUnit {
            imports: extract_imports(&grammar, root, bytes),
            ..Default::default()
        };

        let mut exported: HashSet<String> = HashSet::new();
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "export_statement" => {
                    let doc = jsdoc_before(child, bytes);
                    let mut found = false;
                    let mut inner = child.walk();
                    for decl in child.named_children(&mut inner) {
                        let apis = extract_declaration(decl, bytes, path, doc.as_deref(), true);
                        found |= !apis.is_empty();
                        for api in apis {
                            exported.insert(api.name.clone());
                            unit.apis.push(api);
                        }
                    }
                    if !found {
                        exported.extend(export_clause_names(child, bytes));
                    }
                }
                _ => {
                    let doc = jsdoc_before(child, bytes);
                    unit.apis
                        .extend(extract_declaration(child, bytes, path, doc.as_deref(), false));
                }
            }
        }

        // `export { foo }` after a plain declaration
        for api in &mut unit.apis {
            if exported.contains(&api.name) {
                api.is_public = true;
            }
        }

        let mut exports: Vec<String> = exported.into_iter().collect();
        exports.sort();
        unit.exports = exports;

        Ok(unit)
    }

    fn language(&self) -> Language {
        self.language
    }
}

fn extract_imports(
    language: &tree_sitter::Language,
    root: tree_sitter::Node,
    content: &[u8],
) -> Vec<String> {
    let query_str = r#"
        (import_statement
            source: (string) @source
        )
    "#;

    query_texts(language, query_str, root, content)
        .into_iter()
        .map(|s| s.trim_matches(|c| c == '"' || c == '\'').to_string())
        .collect()
}

/// Names listed in `export { a, b as c }`; the exported alias wins
fn export_clause_names(export: tree_sitter::Node, content: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = export.walk();
    for child in export.named_children(&mut cursor) {
        if child.kind() != "export_clause" {
            continue;
        }
        let mut inner = child.walk();
        for spec in child.named_children(&mut inner) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let name_node = spec
                .child_by_field_name("alias")
                .or_else(|| spec.child_by_field_name("name"));
            if let Some(node) = name_node {
                names.push(get_node_text(node, content).to_string());
            }
        }
    }
    names
}

fn extract_declaration(
    node: tree_sitter::Node,
    content: &[u8],
    path: &str,
    doc: Option<&str>,
    is_public: bool,
) -> Vec<ApiElement> {
    let kind = match node.kind() {
        "function_declaration" | "generator_function_declaration" => ApiKind::Function,
        "class_declaration" | "abstract_class_declaration" => ApiKind::Class,
        "interface_declaration" => ApiKind::Interface,
        "type_alias_declaration" => ApiKind::Type,
        "lexical_declaration" | "variable_declaration" => {
            return extract_variables(node, content, path, doc, is_public);
        }
        _ => return Vec::new(),
    };

    let Some(name_node) = node.child_by_field_name("name") else {
        return Vec::new();
    };

    let cut = match kind {
        ApiKind::Type => None,
        _ => node.child_by_field_name("body"),
    };

    let mut element = ApiElement::new(kind, get_node_text(name_node, content))
        .with_signature(signature_before(node, cut, content))
        .with_public(is_public)
        .with_location(location_from_node(node, path));

    if kind == ApiKind::Function {
        if let Some(params) = node.child_by_field_name("parameters") {
            element = element.with_parameters(extract_parameters(params, content));
        }
        if let Some(ret) = node.child_by_field_name("return_type") {
            element = element.with_return_type(type_annotation_text(ret, content));
        }
    }

    if let Some(doc) = doc {
        element = element.with_documentation(doc);
    }

    vec![element]
}

/// `const a = 1, b = () => {}`: arrow functions and function expressions
/// become functions, everything else a constant.
fn extract_variables(
    node: tree_sitter::Node,
    content: &[u8],
    path: &str,
    doc: Option<&str>,
    is_public: bool,
) -> Vec<ApiElement> {
    let mut elements = Vec::new();
    let keyword = node
        .child(0)
        .map(|k| get_node_text(k, content))
        .unwrap_or("const");

    let mut cursor = node.walk();
    for declarator in node.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        // Destructuring patterns declare no single name
        if name_node.kind() != "identifier" {
            continue;
        }
        let name = get_node_text(name_node, content);
        let value = declarator.child_by_field_name("value");

        let is_function = value
            .map(|v| {
                matches!(
                    v.kind(),
                    "arrow_function" | "function_expression" | "function"
                )
            })
            .unwrap_or(false);

        let mut element = if let (true, Some(func)) = (is_function, value) {
            let header = signature_before(func, func.child_by_field_name("body"), content);
            let mut el = ApiElement::new(ApiKind::Function, name)
                .with_signature(format!("{} {} = {}", keyword, name, header));
            if let Some(params) = func.child_by_field_name("parameters") {
                el = el.with_parameters(extract_parameters(params, content));
            } else if let Some(param) = func.child_by_field_name("parameter") {
                el = el.with_parameters(vec![Parameter::new(get_node_text(param, content))]);
            }
            if let Some(ret) = func.child_by_field_name("return_type") {
                el = el.with_return_type(type_annotation_text(ret, content));
            }
            el
        } else {
            let header = signature_before(declarator, value, content);
            ApiElement::new(ApiKind::Constant, name).with_signature(format!("{} {}", keyword, header))
        };

        element = element
            .with_public(is_public)
            .with_location(location_from_node(declarator, path));
        if let Some(doc) = doc {
            element = element.with_documentation(doc);
        }
        elements.push(element);
    }

    elements
}

fn extract_parameters(params: tree_sitter::Node, content: &[u8]) -> Vec<Parameter> {
    let mut result = Vec::new();
    let mut cursor = params.walk();

    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "required_parameter" | "optional_parameter" => {
                let name = param
                    .child_by_field_name("pattern")
                    .map(|p| get_node_text(p, content))
                    .unwrap_or_else(|| get_node_text(param, content));
                let mut p = Parameter::new(name);
                if let Some(ty) = param.child_by_field_name("type") {
                    p = p.with_type(type_annotation_text(ty, content));
                }
                if param.kind() == "optional_parameter" {
                    p = p.optional();
                }
                if let Some(value) = param.child_by_field_name("value") {
                    p = p.with_default(get_node_text(value, content));
                }
                result.push(p);
            }
            // Plain JavaScript parameters
            "identifier" | "rest_pattern" | "object_pattern" | "array_pattern" => {
                result.push(Parameter::new(get_node_text(param, content)));
            }
            "assignment_pattern" => {
                let name = param
                    .child_by_field_name("left")
                    .map(|l| get_node_text(l, content))
                    .unwrap_or_default();
                let mut p = Parameter::new(name);
                if let Some(right) = param.child_by_field_name("right") {
                    p = p.with_default(get_node_text(right, content));
                }
                result.push(p);
            }
            _ => {}
        }
    }

    result
}

/// `: Promise<User>` -> `Promise<User>`
fn type_annotation_text(node: tree_sitter::Node, content: &[u8]) -> String {
    get_node_text(node, content)
        .trim_start()
        .trim_start_matches(':')
        .trim()
        .to_string()
}

/// JSDoc block ending on the line directly above `node`
fn jsdoc_before(node: tree_sitter::Node, content: &[u8]) -> Option<String> {
    let prev = node.prev_sibling()?;
    if prev.kind() != "comment" || prev.end_position().row + 1 < node.start_position().row {
        return None;
    }
    let text = get_node_text(prev, content);
    if !text.starts_with("/**") {
        return None;
    }

    let body = text.trim_start_matches("/**").trim_end_matches("*/");
    let cleaned: Vec<&str> = body
        .lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .filter(|l| !l.is_empty())
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("\n"))
    }
}
