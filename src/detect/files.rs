use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{ChangeDetector, ChangeTarget, PathFilter, normalize_path, show_file};
use crate::analyzer::parser::Language;
use crate::analyzer::scanner::FileScanner;
use crate::constants::git::DEFAULT_TARGET;
use crate::types::{CodeChange, Result};

/// Treats a set of files as changed relative to their `HEAD` version.
///
/// Without an explicit list every parseable file under the code roots is
/// considered. Files with no committed version are pure additions; files
/// identical to their committed version are dropped.
pub struct FileChangeDetector {
    repo_root: PathBuf,
    filter: PathFilter,
    ignore: Vec<String>,
}

impl FileChangeDetector {
    pub fn new<P: AsRef<Path>>(repo_root: P, code_roots: &[String], ignore: &[String]) -> Self {
        Self {
            repo_root: repo_root.as_ref().to_path_buf(),
            filter: PathFilter::new(code_roots, ignore),
            ignore: ignore.to_vec(),
        }
    }

    fn scan_code_roots(&self) -> Result<Vec<String>> {
        let extensions = Language::parseable_extensions();
        let mut paths = Vec::new();
        for root in self.filter.roots() {
            let files = FileScanner::new(self.repo_root.join(root))
                .with_base(&self.repo_root)
                .with_extensions(&extensions)
                .with_exclude(&self.ignore)
                .scan()?;
            paths.extend(files.into_iter().map(|f| f.relative));
        }
        Ok(paths)
    }

    /// Repository-relative form of a user-supplied path
    fn relative(&self, path: &str) -> String {
        let p = Path::new(path);
        let stripped = p.strip_prefix(&self.repo_root).unwrap_or(p);
        normalize_path(&stripped.to_string_lossy())
    }

    async fn change_for(&self, path: &str) -> Option<CodeChange> {
        let previous = show_file(&self.repo_root, DEFAULT_TARGET, path).await;
        let current = tokio::fs::read_to_string(self.repo_root.join(path)).await;

        match (current, previous) {
            (Ok(content), Some(previous)) if content == previous => {
                debug!("{} unchanged since {}", path, DEFAULT_TARGET);
                None
            }
            (Ok(content), Some(previous)) => Some(CodeChange::modified(path, previous, content)),
            (Ok(content), None) => Some(CodeChange::added(path, content)),
            (Err(e), Some(previous)) if e.kind() == std::io::ErrorKind::NotFound => {
                Some(CodeChange::deleted(path, previous))
            }
            (Err(e), _) => {
                warn!("Cannot read {}: {}", path, e);
                None
            }
        }
    }
}

/// Drop repeated paths, keeping first-seen order. Nested code roots and
/// repeated list entries both yield the same file more than once.
fn dedup_paths(paths: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

#[async_trait]
impl ChangeDetector for FileChangeDetector {
    async fn detect(&self, target: Option<&ChangeTarget>) -> Result<Vec<CodeChange>> {
        let paths = match target {
            Some(ChangeTarget::Files(files)) => files
                .iter()
                .map(|f| self.relative(f))
                .filter(|p| {
                    let parseable = Language::from_path(p).has_parser_support();
                    if !parseable {
                        debug!("Skipping {} (no parser)", p);
                    }
                    parseable && !self.filter.is_ignored(p)
                })
                .collect::<Vec<_>>(),
            Some(ChangeTarget::Commit(rev)) => {
                warn!(
                    "File mode compares against {}; ignoring revision {}",
                    DEFAULT_TARGET, rev
                );
                self.scan_code_roots()?
            }
            None => self.scan_code_roots()?,
        };
        let paths = dedup_paths(paths);

        let mut changes = Vec::new();
        for path in &paths {
            changes.extend(self.change_for(path).await);
        }

        info!(
            "Detected {} code change(s) across {} file(s)",
            changes.len(),
            paths.len()
        );
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::{commit_all, make_git_repo};
    use crate::types::ChangeType;
    use std::fs;

    #[tokio::test]
    async fn test_without_git_everything_is_added() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.ts"), "export const A = 1;\n").unwrap();
        fs::write(dir.path().join("src/notes.md"), "# notes\n").unwrap();

        let detector = FileChangeDetector::new(dir.path(), &["src".to_string()], &[]);
        let changes = detector.detect(None).await.unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].file_path, "src/a.ts");
        assert_eq!(changes[0].change_type, ChangeType::Added);
        assert!(changes[0].previous_content.is_none());
    }

    #[tokio::test]
    async fn test_unchanged_files_are_dropped() {
        let repo = make_git_repo();
        let root = repo.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/same.py"), "def same():\n    pass\n").unwrap();
        fs::write(root.join("src/edit.py"), "def edit():\n    pass\n").unwrap();
        commit_all(root, "initial");
        fs::write(root.join("src/edit.py"), "def edit(x):\n    pass\n").unwrap();

        let detector = FileChangeDetector::new(root, &["src".to_string()], &[]);
        let changes = detector.detect(None).await.unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].file_path, "src/edit.py");
        assert_eq!(changes[0].change_type, ChangeType::Modified);
        assert_eq!(
            changes[0].previous_content.as_deref(),
            Some("def edit():\n    pass\n")
        );
    }

    #[tokio::test]
    async fn test_explicit_file_list() {
        let repo = make_git_repo();
        let root = repo.path();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("lib/old.rs"), "pub fn old() {}\n").unwrap();
        commit_all(root, "initial");
        fs::remove_file(root.join("lib/old.rs")).unwrap();
        fs::write(root.join("lib/new.rs"), "pub fn new() {}\n").unwrap();

        // explicit lists are not restricted to the code roots
        let detector = FileChangeDetector::new(root, &["src".to_string()], &[]);
        let absolute = root.join("lib/new.rs").to_string_lossy().into_owned();
        let target = ChangeTarget::Files(vec![
            "./lib/old.rs".to_string(),
            absolute,
            "README.md".to_string(),
        ]);
        let changes = detector.detect(Some(&target)).await.unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].file_path, "lib/old.rs");
        assert_eq!(changes[0].change_type, ChangeType::Deleted);
        assert_eq!(changes[1].file_path, "lib/new.rs");
        assert_eq!(changes[1].change_type, ChangeType::Added);
    }

    #[tokio::test]
    async fn test_nested_code_roots_report_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/api")).unwrap();
        fs::write(dir.path().join("src/api/x.ts"), "export const X = 1;\n").unwrap();
        fs::write(dir.path().join("src/z.ts"), "export const Z = 1;\n").unwrap();

        let roots = ["src".to_string(), "src/api".to_string()];
        let detector = FileChangeDetector::new(dir.path(), &roots, &[]);
        let changes = detector.detect(None).await.unwrap();

        let paths: Vec<&str> = changes.iter().map(|c| c.file_path.as_str()).collect();
        assert_eq!(paths, vec!["src/api/x.ts", "src/z.ts"]);
    }

    #[tokio::test]
    async fn test_repeated_list_entries_report_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.py"), "def a():\n    pass\n").unwrap();

        let detector = FileChangeDetector::new(dir.path(), &["src".to_string()], &[]);
        let target = ChangeTarget::Files(vec!["src/a.py".to_string(), "./src/a.py".to_string()]);
        let changes = detector.detect(Some(&target)).await.unwrap();

        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_dedup_paths_keeps_first_seen_order() {
        let paths = ["b", "a", "b", "c", "a"].map(String::from).to_vec();
        assert_eq!(dedup_paths(paths), vec!["b", "a", "c"]);
    }
}
