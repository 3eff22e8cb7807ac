//! Change Detection
//!
//! Produces the [`CodeChange`] records the agent starts from:
//! - [`GitChangeDetector`]: working tree against a commit (`git diff --name-status`)
//! - [`FileChangeDetector`]: an explicit file list, or every parseable file
//!   under the code roots, against `HEAD`

mod files;
mod git;

pub use files::FileChangeDetector;
pub use git::GitChangeDetector;

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::analyzer::parser::Language;
use crate::types::{CodeChange, DocSyncError, Result};

/// What to compare the working tree against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeTarget {
    /// A git revision (commit, branch, tag)
    Commit(String),
    /// Repository-relative (or absolute) file paths
    Files(Vec<String>),
}

#[async_trait]
pub trait ChangeDetector: Send + Sync {
    async fn detect(&self, target: Option<&ChangeTarget>) -> Result<Vec<CodeChange>>;
}

// =============================================================================
// Path Filtering
// =============================================================================

/// Code-root and ignore-glob filter shared by both detectors.
///
/// Paths are repository-relative and `/`-separated.
#[derive(Debug, Clone)]
pub(crate) struct PathFilter {
    roots: Vec<String>,
    ignore: Vec<glob::Pattern>,
}

impl PathFilter {
    pub(crate) fn new(code_roots: &[String], ignore: &[String]) -> Self {
        let roots = code_roots.iter().map(|r| normalize_path(r)).collect();
        let ignore = ignore
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid glob '{}': {}", p, e);
                    None
                }
            })
            .collect();
        Self { roots, ignore }
    }

    pub(crate) fn roots(&self) -> &[String] {
        &self.roots
    }

    pub(crate) fn is_ignored(&self, path: &str) -> bool {
        self.ignore.iter().any(|p| p.matches(path))
    }

    pub(crate) fn in_code_root(&self, path: &str) -> bool {
        self.roots.iter().any(|root| {
            root.is_empty()
                || path == root
                || path
                    .strip_prefix(root.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// In a code root, not ignored, and parseable
    pub(crate) fn accepts(&self, path: &str) -> bool {
        let keep = self.in_code_root(path)
            && !self.is_ignored(path)
            && Language::from_path(path).has_parser_support();
        if !keep {
            debug!("Skipping {}", path);
        }
        keep
    }
}

/// Strips `./` and trailing slashes; `.` becomes the empty (whole repo) root
pub(crate) fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut path = path.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    let path = path.trim_end_matches('/');
    if path == "." {
        String::new()
    } else {
        path.to_string()
    }
}

// =============================================================================
// Git Helpers
// =============================================================================

/// Run git in `repo_root` and return stdout
pub(crate) async fn run_git(repo_root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| DocSyncError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DocSyncError::Git(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// File content at a revision, `None` when it does not exist there
pub(crate) async fn show_file(repo_root: &Path, rev: &str, path: &str) -> Option<String> {
    let spec = format!("{rev}:{path}");
    match run_git(repo_root, &["show", &spec]).await {
        Ok(content) => Some(content),
        Err(e) => {
            debug!("No committed version of {}: {}", spec, e);
            None
        }
    }
}
