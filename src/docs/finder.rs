use super::{DocumentationIndex, WordMatcher};
use crate::types::{ApiElement, CodeExample, DocReference, ReferenceType};

/// Fence markers that open and close a code block
const FENCE_MARKERS: &[&str] = &["```", "~~~"];

/// Looks up textual mentions of an element in a [`DocumentationIndex`].
///
/// Read-only: the index is borrowed for the lifetime of the finder.
pub struct ReferenceFinder<'a> {
    index: &'a DocumentationIndex,
}

impl<'a> ReferenceFinder<'a> {
    pub fn new(index: &'a DocumentationIndex) -> Self {
        Self { index }
    }

    /// One reference per line that mentions `element.name` as a whole word
    pub fn find_references(&self, element: &ApiElement) -> Vec<DocReference> {
        let matcher = WordMatcher::new(&element.name);
        let mut references = Vec::new();

        for doc in self.index.iter() {
            let lines: Vec<&str> = doc.content.lines().collect();
            for (i, line) in lines.iter().enumerate() {
                if !matcher.is_match(line) {
                    continue;
                }
                let start = i.saturating_sub(1);
                let end = (i + 2).min(lines.len());
                references.push(DocReference {
                    file_path: doc.path.clone(),
                    line_number: i + 1,
                    context: lines[start..end].join("\n"),
                    reference_type: ReferenceType::Name,
                });
            }
        }

        references
    }

    /// Fenced code blocks whose body mentions `element.name` as a whole word
    pub fn find_code_examples(&self, element: &ApiElement) -> Vec<CodeExample> {
        let matcher = WordMatcher::new(&element.name);
        let mut examples = Vec::new();

        for doc in self.index.iter() {
            for block in fenced_blocks(&doc.content) {
                if matcher.is_match(&block.code) {
                    examples.push(CodeExample {
                        file_path: doc.path.clone(),
                        code: block.code,
                        language: block.language,
                        start_line: block.start_line,
                        end_line: block.end_line,
                    });
                }
            }
        }

        examples
    }
}

#[derive(Debug, PartialEq, Eq)]
struct FencedBlock {
    code: String,
    language: String,
    start_line: usize,
    end_line: usize,
}

/// Split text into terminated fenced blocks; line numbers are 1-based and
/// cover the body only. An opener with no matching close is skipped and
/// scanning resumes on the next line.
fn fenced_blocks(content: &str) -> Vec<FencedBlock> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let opener = lines[i].trim_start();
        let Some(marker) = FENCE_MARKERS.iter().find(|m| opener.starts_with(**m)) else {
            i += 1;
            continue;
        };

        let language = opener[marker.len()..]
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        let close = lines[i + 1..]
            .iter()
            .position(|l| l.trim() == *marker)
            .map(|offset| i + 1 + offset);

        let Some(close) = close else {
            i += 1;
            continue;
        };

        blocks.push(FencedBlock {
            code: lines[i + 1..close].join("\n"),
            language,
            start_line: i + 2,
            end_line: close,
        });
        i = close + 1;
    }

    blocks
}
