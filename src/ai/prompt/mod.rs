//! Prompt Builder
//!
//! Sectioned prompt construction plus the documentation update template.

use crate::config::DocFormat;
use crate::constants::prompt::{MAX_CHANGES, MAX_DOC_CHARS};
use crate::types::{ApiDiff, ApiElement, ChangeSeverity, DocFile};

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Ordered key-value pairs
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Fenced block with language tag
    Code { language: String, content: String },
    /// Hard constraints on the output
    Rules(Vec<String>),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add a context item, appending to the existing context section
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let item = (key.to_string(), value.to_string());
        if let Some(PromptSection::Context(items)) = self
            .sections
            .iter_mut()
            .find(|s| matches!(s, PromptSection::Context(_)))
        {
            items.push(item);
        } else {
            self.sections.push(PromptSection::Context(vec![item]));
        }
        self
    }

    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn rules(mut self, rules: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Rules(
            rules.into_iter().map(String::from).collect(),
        ));
        self
    }

    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    // a longer fence than any run of backticks inside the body
                    let longest = content
                        .split(|c| c != '`')
                        .map(str::len)
                        .max()
                        .unwrap_or(0);
                    let fence = "`".repeat(longest.max(2) + 1);
                    prompt.push_str(&format!("{}{}\n", fence, language));
                    prompt.push_str(&content);
                    prompt.push_str(&format!("\n{}\n\n", fence));
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("<RULES>\n");
                    for rule in rules {
                        prompt.push_str(&format!("- {}\n", rule));
                    }
                    prompt.push_str("</RULES>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Documentation Update Template
// =============================================================================

/// One-line descriptions of the diff entries this document talks about.
///
/// An entry is relevant when its name occurs as a whole word in one of the
/// file's reference contexts or code examples.
pub fn relevant_changes(doc: &DocFile, diff: &ApiDiff) -> Vec<String> {
    let mentioned = |element: &ApiElement| doc.mentions(&element.name);

    let added = diff
        .added
        .iter()
        .filter(|e| mentioned(*e))
        .map(|e| format!("ADDED {} `{}`: `{}`", e.kind, e.name, e.signature));
    let removed = diff
        .removed
        .iter()
        .filter(|e| mentioned(*e))
        .map(|e| format!("REMOVED {} `{}` (was `{}`)", e.kind, e.name, e.signature));
    let modified = diff.modified.iter().filter(|m| mentioned(&m.new)).map(|m| {
        let details: Vec<&str> = m.changes.iter().map(|c| c.description.as_str()).collect();
        format!(
            "MODIFIED {} `{}`: {}",
            m.new.kind,
            m.new.name,
            details.join("; ")
        )
    });

    added.chain(removed).chain(modified).take(MAX_CHANGES).collect()
}

/// Prompt asking for the full rewritten document
pub fn doc_update_prompt(
    doc: &DocFile,
    changes: &[String],
    severity: ChangeSeverity,
    format: DocFormat,
) -> String {
    let content = if doc.content.chars().count() > MAX_DOC_CHARS {
        let truncated: String = doc.content.chars().take(MAX_DOC_CHARS).collect();
        format!("{}\n[... truncated ...]", truncated)
    } else {
        doc.content.clone()
    };

    let lines: Vec<String> = doc
        .references
        .iter()
        .map(|r| r.line_number.to_string())
        .collect();

    PromptBuilder::new()
        .role("technical writer", "keeping API documentation accurate")
        .objectives(vec![
            "Update the document so it matches the API changes listed below",
            "Fix signatures, parameter lists and code examples that no longer compile",
            "Remove or mark documentation of removed APIs",
        ])
        .context_item("File", &doc.path)
        .context_item("Format", format.as_str())
        .context_item("Change severity", severity.as_str())
        .context_item("Referenced lines", &lines.join(", "))
        .section("API Changes", &changes.join("\n"))
        .section("Current Document", "")
        .code(format.as_str(), &content)
        .rules(vec![
            "Return the COMPLETE document in updatedContent, not a diff",
            "Preserve structure, tone and unrelated content exactly",
            "Do NOT invent APIs that are not listed above",
            "Explain what you changed and why in reasoning",
        ])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChangeDetail, ChangeKind, CodeExample, DocReference, ModifiedApi, ReferenceType};

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("technical writer", "API docs")
            .objectives(vec!["Read", "Write"])
            .context_item("File", "docs/api.md")
            .context_item("Format", "markdown")
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("1. Read\n2. Write"));
        assert!(prompt.contains("**File**: docs/api.md\n**Format**: markdown"));
    }

    #[test]
    fn test_code_fence_outgrows_content() {
        let prompt = PromptBuilder::new()
            .code("markdown", "```ts\nfoo()\n```")
            .build();
        assert!(prompt.starts_with("````markdown\n"));
        assert!(prompt.ends_with("\n````"));
    }

    fn doc() -> DocFile {
        let mut doc = DocFile::new("docs/api.md", "Call `foo()` then `bar()`.\n");
        doc.references.push(DocReference {
            file_path: "docs/api.md".to_string(),
            line_number: 1,
            context: "Call `foo()` then `bar()`.".to_string(),
            reference_type: ReferenceType::Name,
        });
        doc.examples.push(CodeExample {
            file_path: "docs/api.md".to_string(),
            code: "baz(1)".to_string(),
            language: "ts".to_string(),
            start_line: 3,
            end_line: 3,
        });
        doc
    }

    #[test]
    fn test_relevant_changes_only_lists_mentioned_names() {
        let old = ApiElement::function("foo").with_signature("function foo()");
        let new = ApiElement::function("foo").with_signature("function foo(x)");
        let diff = ApiDiff {
            added: vec![ApiElement::function("baz"), ApiElement::function("qux")],
            removed: vec![ApiElement::function("bar")],
            modified: vec![ModifiedApi {
                old,
                new,
                changes: vec![ChangeDetail::new(
                    ChangeKind::Signature,
                    "Signature changed from `function foo()` to `function foo(x)`",
                )],
            }],
            unchanged: vec![],
        };

        let changes = relevant_changes(&doc(), &diff);
        assert_eq!(changes.len(), 3);
        assert!(changes[0].starts_with("ADDED function `baz`"));
        assert!(changes[1].starts_with("REMOVED function `bar`"));
        assert!(changes[2].contains("function foo(x)"));
    }

    #[test]
    fn test_doc_update_prompt() {
        let prompt = doc_update_prompt(
            &doc(),
            &["REMOVED function `bar`".to_string()],
            ChangeSeverity::Breaking,
            DocFormat::Markdown,
        );
        assert!(prompt.contains("**File**: docs/api.md"));
        assert!(prompt.contains("**Change severity**: breaking"));
        assert!(prompt.contains("**Referenced lines**: 1"));
        assert!(prompt.contains("REMOVED function `bar`"));
        assert!(prompt.contains("Call `foo()` then `bar()`."));
        assert!(prompt.contains("updatedContent"));
    }
}
