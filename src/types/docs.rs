use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ApiElement;

/// How a documentation line refers to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// Whole-word occurrence of the element name
    Name,
}

/// A single line of documentation mentioning an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocReference {
    pub file_path: String,
    /// 1-based
    pub line_number: usize,
    /// Previous line, matching line and next line, clipped at file edges
    pub context: String,
    pub reference_type: ReferenceType,
}

/// Body of one fenced code block that mentions an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    pub file_path: String,
    pub code: String,
    pub language: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// A documentation file together with every hit collected for it during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFile {
    pub path: String,
    pub content: String,
    pub references: Vec<DocReference>,
    pub examples: Vec<CodeExample>,
}

impl DocFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            references: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Whether any reference or example in this file mentions `name`
    pub fn mentions(&self, name: &str) -> bool {
        let matcher = crate::docs::WordMatcher::new(name);
        self.references.iter().any(|r| matcher.is_match(&r.context))
            || self.examples.iter().any(|e| matcher.is_match(&e.code))
    }
}

/// Documentation files touched by a set of API changes.
///
/// Files keep first-hit order; `index` maps a path to its position in `files`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AffectedDocumentation {
    files: Vec<DocFile>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    pub total_references: usize,
    pub missing_docs: Vec<ApiElement>,
}

impl AffectedDocumentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for `path`, creating it with `content` on first use
    pub fn entry(&mut self, path: &str, content: &str) -> &mut DocFile {
        let pos = match self.index.get(path) {
            Some(&pos) => pos,
            None => {
                self.files.push(DocFile::new(path, content));
                let pos = self.files.len() - 1;
                self.index.insert(path.to_string(), pos);
                pos
            }
        };
        &mut self.files[pos]
    }

    pub fn get(&self, path: &str) -> Option<&DocFile> {
        self.index.get(path).map(|&pos| &self.files[pos])
    }

    pub fn files(&self) -> &[DocFile] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(path: &str, line: usize) -> DocReference {
        DocReference {
            file_path: path.to_string(),
            line_number: line,
            context: "getUser()".to_string(),
            reference_type: ReferenceType::Name,
        }
    }

    #[test]
    fn test_entry_is_created_once_and_keeps_order() {
        let mut affected = AffectedDocumentation::new();
        affected.entry("b.md", "B").references.push(reference("b.md", 1));
        affected.entry("a.md", "A").references.push(reference("a.md", 1));
        affected.entry("b.md", "ignored").references.push(reference("b.md", 4));

        let paths: Vec<_> = affected.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["b.md", "a.md"]);

        let b = affected.get("b.md").unwrap();
        assert_eq!(b.content, "B");
        assert_eq!(b.references.len(), 2);
    }

    #[test]
    fn test_mentions() {
        let mut doc = DocFile::new("a.md", "");
        doc.references.push(reference("a.md", 1));
        assert!(doc.mentions("getUser"));
        assert!(!doc.mentions("getUserById"));
    }
}
