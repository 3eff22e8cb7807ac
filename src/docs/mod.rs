//! Documentation Index & Reference Finder
//!
//! Maps changed API elements onto the documentation corpus:
//! - [`DocumentationIndex`]: immutable snapshot of doc files for one run
//! - [`ReferenceFinder`]: line references and fenced code examples per element
//! - [`map_affected_docs`]: groups every hit by file and flags undocumented public APIs

pub mod finder;
pub mod index;
pub mod mapper;

pub use finder::ReferenceFinder;
pub use index::{DocumentationIndex, IndexedDoc};
pub use mapper::map_affected_docs;

use regex::Regex;

/// Whole-word matcher for an element name.
///
/// A word character is an ASCII letter, digit, `_`, `$`, or any Unicode
/// alphanumeric, so `getUser` never matches inside `getUserById` or `$getUser`.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    regex: Option<Regex>,
}

impl WordMatcher {
    pub fn new(name: &str) -> Self {
        if name.is_empty() {
            return Self { regex: None };
        }
        let pattern = format!(r"(?:^|[^\w$]){}(?:[^\w$]|$)", regex::escape(name));
        Self {
            regex: Regex::new(&pattern).ok(),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_boundary_isolation() {
        let m = WordMatcher::new("getUser");
        assert!(m.is_match("call getUser() first"));
        assert!(m.is_match("getUser"));
        assert!(m.is_match("`getUser`."));
        assert!(!m.is_match("call getUserById() instead"));
        assert!(!m.is_match("use _getUser"));
        assert!(!m.is_match("use $getUser"));
        assert!(!m.is_match("prefixgetUser"));
    }

    #[test]
    fn test_unicode_neighbours_are_word_chars() {
        let m = WordMatcher::new("foo");
        assert!(!m.is_match("éfoo"));
        assert!(m.is_match("«foo»"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let m = WordMatcher::new("a.b");
        assert!(m.is_match("see a.b here"));
        assert!(!m.is_match("see axb here"));
    }

    #[test]
    fn test_empty_name_never_matches() {
        assert!(!WordMatcher::new("").is_match("anything"));
    }
}
