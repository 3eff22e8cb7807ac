use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{ChangeDetector, ChangeTarget, PathFilter, run_git, show_file};
use crate::constants::git::DEFAULT_TARGET;
use crate::types::{CodeChange, Result};

/// Compares the working tree against a git revision.
pub struct GitChangeDetector {
    repo_root: PathBuf,
    filter: PathFilter,
}

impl GitChangeDetector {
    pub fn new<P: AsRef<Path>>(repo_root: P, code_roots: &[String], ignore: &[String]) -> Self {
        Self {
            repo_root: repo_root.as_ref().to_path_buf(),
            filter: PathFilter::new(code_roots, ignore),
        }
    }

    async fn read_working_copy(&self, path: &str) -> Option<String> {
        match tokio::fs::read_to_string(self.repo_root.join(path)).await {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Cannot read {} from working tree: {}", path, e);
                None
            }
        }
    }

    async fn added(&self, path: &str) -> Option<CodeChange> {
        self.read_working_copy(path)
            .await
            .map(|content| CodeChange::added(path, content))
    }

    async fn deleted(&self, rev: &str, path: &str) -> Option<CodeChange> {
        show_file(&self.repo_root, rev, path)
            .await
            .map(|previous| CodeChange::deleted(path, previous))
    }

    async fn modified(&self, rev: &str, path: &str) -> Option<CodeChange> {
        let content = self.read_working_copy(path).await?;
        match show_file(&self.repo_root, rev, path).await {
            Some(previous) => Some(CodeChange::modified(path, previous, content)),
            None => Some(CodeChange::added(path, content)),
        }
    }
}

#[async_trait]
impl ChangeDetector for GitChangeDetector {
    async fn detect(&self, target: Option<&ChangeTarget>) -> Result<Vec<CodeChange>> {
        let (rev, pathspec) = match target {
            Some(ChangeTarget::Commit(rev)) => (rev.as_str(), Vec::new()),
            Some(ChangeTarget::Files(files)) => (DEFAULT_TARGET, files.clone()),
            None => (DEFAULT_TARGET, Vec::new()),
        };

        let mut args = vec!["diff", "--name-status", rev];
        if !pathspec.is_empty() {
            args.push("--");
            args.extend(pathspec.iter().map(String::as_str));
        }

        let output = run_git(&self.repo_root, &args).await?;
        let entries = parse_name_status(&output);
        debug!("git diff against {} listed {} path(s)", rev, entries.len());

        let mut changes = Vec::new();
        for entry in entries {
            match entry {
                NameStatus::Added(path) if self.filter.accepts(&path) => {
                    changes.extend(self.added(&path).await);
                }
                NameStatus::Modified(path) if self.filter.accepts(&path) => {
                    changes.extend(self.modified(rev, &path).await);
                }
                NameStatus::Deleted(path) if self.filter.accepts(&path) => {
                    changes.extend(self.deleted(rev, &path).await);
                }
                NameStatus::Renamed { from, to } => {
                    if self.filter.accepts(&from) {
                        changes.extend(self.deleted(rev, &from).await);
                    }
                    if self.filter.accepts(&to) {
                        changes.extend(self.added(&to).await);
                    }
                }
                NameStatus::Copied(path) if self.filter.accepts(&path) => {
                    changes.extend(self.added(&path).await);
                }
                _ => {}
            }
        }

        info!("Detected {} code change(s) against {}", changes.len(), rev);
        Ok(changes)
    }
}

// =============================================================================
// name-status Parsing
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameStatus {
    Added(String),
    Modified(String),
    Deleted(String),
    Renamed { from: String, to: String },
    /// Copy destination; the source is untouched
    Copied(String),
}

/// Parse `git diff --name-status` output.
///
/// Status letters `A`, `M`, `T`, `D`, `R<score>` and `C<score>` are
/// understood; anything else (unmerged, unknown) is skipped.
fn parse_name_status(output: &str) -> Vec<NameStatus> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?.trim();
            let first = fields.next()?.to_string();
            let second = fields.next().map(str::to_string);

            match (status.chars().next()?, second) {
                ('A', _) => Some(NameStatus::Added(first)),
                ('M' | 'T', _) => Some(NameStatus::Modified(first)),
                ('D', _) => Some(NameStatus::Deleted(first)),
                ('R', Some(to)) => Some(NameStatus::Renamed { from: first, to }),
                ('C', Some(to)) => Some(NameStatus::Copied(to)),
                _ => {
                    debug!("Skipping name-status line: {}", line);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::{commit_all, make_git_repo, run_git};
    use crate::types::{ChangeType, DocSyncError};
    use std::fs;

    #[test]
    fn test_parse_name_status() {
        let out = "A\tsrc/new.ts\nM\tsrc/api.ts\nT\tsrc/link.ts\nD\tsrc/old.ts\n\
                   R087\tsrc/a.ts\tsrc/b.ts\nC100\tsrc/c.ts\tsrc/d.ts\nU\tsrc/conflict.ts\n";
        assert_eq!(
            parse_name_status(out),
            vec![
                NameStatus::Added("src/new.ts".into()),
                NameStatus::Modified("src/api.ts".into()),
                NameStatus::Modified("src/link.ts".into()),
                NameStatus::Deleted("src/old.ts".into()),
                NameStatus::Renamed {
                    from: "src/a.ts".into(),
                    to: "src/b.ts".into()
                },
                NameStatus::Copied("src/d.ts".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_detects_working_tree_changes() {
        let repo = make_git_repo();
        let root = repo.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/api.ts"), "export function a() {}\n").unwrap();
        fs::write(root.join("src/gone.py"), "def gone():\n    pass\n").unwrap();
        fs::write(root.join("README.md"), "# readme\n").unwrap();
        commit_all(root, "initial");

        fs::write(root.join("src/api.ts"), "export function a(x) {}\n").unwrap();
        fs::write(root.join("src/new.rs"), "pub fn n() {}\n").unwrap();
        fs::remove_file(root.join("src/gone.py")).unwrap();
        fs::write(root.join("README.md"), "# changed\n").unwrap();
        run_git(root, &["add", "-A"]);

        let detector = GitChangeDetector::new(root, &["src".to_string()], &[]);
        let mut changes = detector.detect(None).await.unwrap();
        changes.sort_by(|a, b| a.file_path.cmp(&b.file_path));

        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].file_path, "src/api.ts");
        assert_eq!(changes[0].change_type, ChangeType::Modified);
        assert_eq!(
            changes[0].previous_content.as_deref(),
            Some("export function a() {}\n")
        );
        assert_eq!(changes[1].file_path, "src/gone.py");
        assert_eq!(changes[1].change_type, ChangeType::Deleted);
        assert!(changes[1].previous_content.as_deref().unwrap().contains("gone"));
        assert_eq!(changes[2].file_path, "src/new.rs");
        assert_eq!(changes[2].change_type, ChangeType::Added);
    }

    #[tokio::test]
    async fn test_ignore_globs_apply() {
        let repo = make_git_repo();
        let root = repo.path();
        fs::create_dir_all(root.join("src/gen")).unwrap();
        fs::write(root.join("src/gen/out.ts"), "export const A = 1;\n").unwrap();
        commit_all(root, "initial");
        fs::write(root.join("src/gen/out.ts"), "export const A = 2;\n").unwrap();

        let detector =
            GitChangeDetector::new(root, &["src".to_string()], &["src/gen/**".to_string()]);
        assert!(detector.detect(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_a_repository_is_git_error() {
        let dir = tempfile::tempdir().unwrap();
        let detector = GitChangeDetector::new(dir.path(), &["src".to_string()], &[]);
        let err = detector.detect(None).await.unwrap_err();
        assert!(matches!(err, DocSyncError::Git(_)));
    }
}
