use tracing::debug;

use super::{DocumentationIndex, ReferenceFinder};
use crate::types::{AffectedDocumentation, ApiDiff};

/// Aggregate references and code examples for every changed element.
///
/// Unchanged elements are never looked up. A public element with no hit at
/// all lands in `missing_docs` and gets no `DocFile`. Hits are appended per
/// element, so a line mentioning two changed elements counts twice toward
/// `total_references`.
pub fn map_affected_docs(index: &DocumentationIndex, diff: &ApiDiff) -> AffectedDocumentation {
    let finder = ReferenceFinder::new(index);
    let mut affected = AffectedDocumentation::new();

    for element in diff.changed_elements() {
        let references = finder.find_references(element);
        let examples = finder.find_code_examples(element);

        if references.is_empty() && examples.is_empty() {
            if element.is_public {
                affected.missing_docs.push(element.clone());
            }
            continue;
        }

        debug!(
            "{}: {} reference(s), {} example(s)",
            element.name,
            references.len(),
            examples.len()
        );

        affected.total_references += references.len();

        for reference in references {
            let content = content_of(index, &reference.file_path);
            affected
                .entry(&reference.file_path, content)
                .references
                .push(reference);
        }

        for example in examples {
            let content = content_of(index, &example.file_path);
            affected
                .entry(&example.file_path, content)
                .examples
                .push(example);
        }
    }

    affected
}

fn content_of<'a>(index: &'a DocumentationIndex, path: &str) -> &'a str {
    index.get(path).map(|d| d.content.as_str()).unwrap_or_default()
}
