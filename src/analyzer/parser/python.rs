use super::traits::{
    LanguageParser, ParsedUnit, create_ts_parser, get_node_text, location_from_node, parse_tree,
    query_texts, signature_before,
};
use super::Language;
use crate::types::{ApiElement, ApiKind, Parameter, Result};

pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Result<Self> {
        // Validate that the language is available
        let _ = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        Ok(Self)
    }
}

impl LanguageParser for PythonParser {
    fn parse(&self, path: &str, content: &str) -> Result<ParsedUnit> {
        let mut parser = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        let tree = parse_tree(&mut parser, path, content, "Python")?;
        let root = tree.root_node();
        let bytes = content.as_bytes();

        let mut unit = ParsedUnit {
            imports: extract_imports(root, bytes),
            ..Default::default()
        };

        let mut cursor = root.walk();
        for stmt in root.named_children(&mut cursor) {
            let element = match stmt.kind() {
                "function_definition" | "class_definition" => {
                    extract_definition(stmt, stmt, bytes, path)
                }
                "decorated_definition" => stmt
                    .child_by_field_name("definition")
                    .and_then(|def| extract_definition(stmt, def, bytes, path)),
                "expression_statement" => extract_constant(stmt, bytes, path),
                _ => None,
            };

            if let Some(element) = element {
                if element.is_public {
                    unit.exports.push(element.name.clone());
                }
                unit.apis.push(element);
            }
        }

        Ok(unit)
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

fn extract_imports(root: tree_sitter::Node, content: &[u8]) -> Vec<String> {
    let query_str = r#"
        (import_statement
            name: (dotted_name) @name
        )
        (import_from_statement
            module_name: (_) @module
        )
    "#;

    query_texts(&tree_sitter_python::LANGUAGE.into(), query_str, root, content)
}

/// `outer` is the decorated wrapper when present so decorators stay in the signature
fn extract_definition(
    outer: tree_sitter::Node,
    def: tree_sitter::Node,
    content: &[u8],
    path: &str,
) -> Option<ApiElement> {
    let kind = match def.kind() {
        "function_definition" => ApiKind::Function,
        "class_definition" => ApiKind::Class,
        _ => return None,
    };

    let name = get_node_text(def.child_by_field_name("name")?, content);
    let body = def.child_by_field_name("body");

    let mut element = ApiElement::new(kind, name)
        .with_signature(signature_before(outer, body, content))
        .with_public(!name.starts_with('_'))
        .with_location(location_from_node(outer, path));

    if kind == ApiKind::Function {
        if let Some(params) = def.child_by_field_name("parameters") {
            element = element.with_parameters(extract_parameters(params, content));
        }
        if let Some(ret) = def.child_by_field_name("return_type") {
            element = element.with_return_type(get_node_text(ret, content));
        }
    }

    if let Some(doc) = body.and_then(|b| docstring(b, content)) {
        element = element.with_documentation(doc);
    }

    Some(element)
}

/// Module-level `UPPER_CASE = ...` assignments
fn extract_constant(stmt: tree_sitter::Node, content: &[u8], path: &str) -> Option<ApiElement> {
    let assignment = stmt.named_child(0)?;
    if assignment.kind() != "assignment" {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    let name = get_node_text(left, content);
    if !is_constant_name(name) {
        return None;
    }

    let right = assignment.child_by_field_name("right");
    Some(
        ApiElement::new(ApiKind::Constant, name)
            .with_signature(signature_before(assignment, right, content))
            .with_public(!name.starts_with('_'))
            .with_location(location_from_node(stmt, path)),
    )
}

fn is_constant_name(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn extract_parameters(params: tree_sitter::Node, content: &[u8]) -> Vec<Parameter> {
    let mut result = Vec::new();
    let mut cursor = params.walk();

    for param in params.named_children(&mut cursor) {
        let parameter = match param.kind() {
            "identifier" => Parameter::new(get_node_text(param, content)),
            "typed_parameter" => {
                let name = param
                    .named_child(0)
                    .map(|n| get_node_text(n, content))
                    .unwrap_or_default();
                let mut p = Parameter::new(name);
                if let Some(ty) = param.child_by_field_name("type") {
                    p = p.with_type(get_node_text(ty, content));
                }
                p
            }
            "default_parameter" | "typed_default_parameter" => {
                let name = param
                    .child_by_field_name("name")
                    .map(|n| get_node_text(n, content))
                    .unwrap_or_default();
                let mut p = Parameter::new(name);
                if let Some(ty) = param.child_by_field_name("type") {
                    p = p.with_type(get_node_text(ty, content));
                }
                if let Some(value) = param.child_by_field_name("value") {
                    p = p.with_default(get_node_text(value, content));
                }
                p
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                Parameter::new(get_node_text(param, content)).optional()
            }
            _ => continue,
        };

        if parameter.name == "self" || parameter.name == "cls" {
            continue;
        }
        result.push(parameter);
    }

    result
}

/// First statement of a body when it is a bare string literal
fn docstring(body: tree_sitter::Node, content: &[u8]) -> Option<String> {
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }

    let raw = get_node_text(literal, content);
    let unprefixed = raw.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let text = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find(|q| unprefixed.starts_with(**q) && unprefixed.ends_with(**q) && unprefixed.len() >= 2 * q.len())
        .map(|q| &unprefixed[q.len()..unprefixed.len() - q.len()])
        .unwrap_or(unprefixed);

    let cleaned: Vec<&str> = text.lines().map(str::trim).collect();
    let joined = cleaned.join("\n").trim().to_string();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ParsedUnit {
        PythonParser::new().unwrap().parse("pkg/users.py", src).unwrap()
    }

    fn find<'a>(unit: &'a ParsedUnit, name: &str) -> &'a ApiElement {
        unit.apis.iter().find(|a| a.name == name).unwrap()
    }

    #[test]
    fn test_function_with_docstring_and_defaults() {
        let unit = parse(
            r#"
import os
from .models import User

def get_user(user_id: int, *, active: bool = True) -> User:
    """Fetch a user.

    Raises KeyError when missing.
    """
    return User(user_id)

def _private():
    pass
"#,
        );

        assert_eq!(unit.imports, vec!["os", ".models"]);
        assert_eq!(unit.exports, vec!["get_user"]);

        let f = find(&unit, "get_user");
        assert_eq!(f.kind, ApiKind::Function);
        assert_eq!(
            f.signature,
            "def get_user(user_id: int, *, active: bool = True) -> User"
        );
        assert_eq!(f.return_type.as_deref(), Some("User"));
        assert_eq!(
            f.documentation.as_deref(),
            Some("Fetch a user.\n\nRaises KeyError when missing.")
        );

        let params = f.params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].param_type.as_deref(), Some("int"));
        assert_eq!(params[1].default_value.as_deref(), Some("True"));
        assert!(params[1].optional);

        assert!(!find(&unit, "_private").is_public);
    }

    #[test]
    fn test_classes_constants_and_decorators() {
        let unit = parse(
            r#"
MAX_RETRIES = 3
TIMEOUT: float = 2.5
lowercase = 1

@dataclass
class Config:
    '''Runtime settings.'''
    name: str

class Service:
    def run(self, job):
        pass

    @classmethod
    def create(cls):
        pass
"#,
        );

        let max = find(&unit, "MAX_RETRIES");
        assert_eq!(max.kind, ApiKind::Constant);
        assert_eq!(max.signature, "MAX_RETRIES");
        assert_eq!(find(&unit, "TIMEOUT").signature, "TIMEOUT: float");
        assert!(unit.apis.iter().all(|a| a.name != "lowercase"));

        let config = find(&unit, "Config");
        assert_eq!(config.kind, ApiKind::Class);
        assert_eq!(config.signature, "@dataclass class Config");
        assert_eq!(config.documentation.as_deref(), Some("Runtime settings."));

        // methods are not top-level
        assert!(unit.apis.iter().all(|a| a.name != "run"));
    }

    #[test]
    fn test_self_and_cls_are_skipped() {
        let params = extract_params_of("def m(self, a, *args, **kwargs):\n    pass\n");
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "*args", "**kwargs"]);

        let params = extract_params_of("def c(cls):\n    pass\n");
        assert!(params.is_empty());
    }

    fn extract_params_of(src: &str) -> Vec<Parameter> {
        parse(src).apis[0].params().to_vec()
    }

    #[test]
    fn test_syntax_error() {
        assert!(
            PythonParser::new()
                .unwrap()
                .parse("bad.py", "def broken(:\n")
                .is_err()
        );
    }
}
