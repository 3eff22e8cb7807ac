use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::analyzer::scanner::FileScanner;
use crate::config::DocFormat;
use crate::types::Result;

/// One indexed documentation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDoc {
    /// Path relative to the repository root
    pub path: String,
    pub content: String,
}

/// In-memory snapshot of the documentation corpus.
///
/// Built once per run and never mutated afterwards. Iteration order is the
/// walk order: roots in configuration order, files sorted by name.
#[derive(Debug, Default)]
pub struct DocumentationIndex {
    root: PathBuf,
    docs: Vec<IndexedDoc>,
    positions: HashMap<String, usize>,
}

impl DocumentationIndex {
    /// Walk every documentation root below `repo_root`.
    ///
    /// Missing roots are skipped. Files that are not valid UTF-8 are skipped.
    /// Any other read failure is returned.
    pub fn initialize(
        repo_root: &Path,
        roots: &[String],
        ignore: &[String],
        format: DocFormat,
    ) -> Result<Self> {
        let mut index = Self {
            root: repo_root.to_path_buf(),
            ..Default::default()
        };

        for root in roots {
            let root_path = repo_root.join(root);
            if !root_path.exists() {
                debug!("Documentation root not found, skipping: {}", root);
                continue;
            }

            let files = FileScanner::new(&root_path)
                .with_base(repo_root)
                .with_extensions(format.extensions())
                .with_exclude(ignore)
                .scan()?;

            for file in files {
                if index.positions.contains_key(&file.relative) {
                    continue;
                }

                let bytes = std::fs::read(&file.path)?;
                let content = match String::from_utf8(bytes) {
                    Ok(content) => content,
                    Err(_) => {
                        debug!("Skipping non-UTF-8 documentation file: {}", file.relative);
                        continue;
                    }
                };

                index.insert(file.relative, content);
            }
        }

        info!(
            "Indexed {} documentation file(s) ({})",
            index.len(),
            format
        );

        Ok(index)
    }

    /// Build an index from in-memory documents, keeping the given order
    pub fn from_documents<I, P, C>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let mut index = Self::default();
        for (path, content) in documents {
            index.insert(path.into(), content.into());
        }
        index
    }

    fn insert(&mut self, path: String, content: String) {
        if let Some(&pos) = self.positions.get(&path) {
            self.docs[pos].content = content;
            return;
        }
        self.positions.insert(path.clone(), self.docs.len());
        self.docs.push(IndexedDoc { path, content });
    }

    pub fn get(&self, path: &str) -> Option<&IndexedDoc> {
        self.positions.get(path).map(|&pos| &self.docs[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedDoc> {
        self.docs.iter()
    }

    /// Absolute location of an indexed path
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_walks_roots_in_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs/api")).unwrap();
        fs::write(dir.path().join("docs/api/users.md"), "# Users").unwrap();
        fs::write(dir.path().join("docs/intro.md"), "# Intro").unwrap();
        fs::write(dir.path().join("docs/diagram.png"), [0u8, 1, 2]).unwrap();
        fs::write(dir.path().join("README.md"), "# Readme").unwrap();

        let index = DocumentationIndex::initialize(
            dir.path(),
            &["README.md".to_string(), "docs".to_string(), "missing".to_string()],
            &[],
            DocFormat::Markdown,
        )
        .unwrap();

        let paths: Vec<_> = index.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "docs/api/users.md", "docs/intro.md"]);
        assert_eq!(index.get("docs/intro.md").unwrap().content, "# Intro");
        assert_eq!(index.resolve("README.md"), dir.path().join("README.md"));
    }

    #[test]
    fn test_overlapping_roots_index_once() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/a.md"), "a").unwrap();

        let index = DocumentationIndex::initialize(
            dir.path(),
            &["docs".to_string(), "docs/a.md".to_string()],
            &[],
            DocFormat::Markdown,
        )
        .unwrap();

        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_format_and_ignore_filtering() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs/drafts")).unwrap();
        fs::write(dir.path().join("docs/guide.rst"), "Guide").unwrap();
        fs::write(dir.path().join("docs/guide.md"), "Guide").unwrap();
        fs::write(dir.path().join("docs/drafts/wip.rst"), "WIP").unwrap();

        let index = DocumentationIndex::initialize(
            dir.path(),
            &["docs".to_string()],
            &["docs/drafts/**".to_string()],
            DocFormat::ReStructuredText,
        )
        .unwrap();

        let paths: Vec<_> = index.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["docs/guide.rst"]);
    }

    #[test]
    fn test_non_utf8_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/bad.md"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("docs/good.md"), "ok").unwrap();

        let index = DocumentationIndex::initialize(
            dir.path(),
            &["docs".to_string()],
            &[],
            DocFormat::Markdown,
        )
        .unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.get("docs/good.md").is_some());
    }
}
