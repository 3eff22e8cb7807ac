use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::types::Result;

/// Files larger than this are skipped (1MB)
const MAX_FILE_SIZE: u64 = 1_048_576;

/// Walks a root (file or directory) and yields files matching an extension set.
///
/// Paths are reported relative to `base`, which is also what exclude globs
/// are matched against. A missing root yields no files.
pub struct FileScanner {
    root: PathBuf,
    base: PathBuf,
    extensions: Vec<String>,
    exclude: Vec<glob::Pattern>,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            base: root.clone(),
            root,
            extensions: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Directory that reported paths and exclude globs are relative to
    pub fn with_base<P: AsRef<Path>>(mut self, base: P) -> Self {
        self.base = base.as_ref().to_path_buf();
        self
    }

    /// Keep only files with one of these extensions (case-insensitive).
    /// An empty list keeps everything.
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.as_ref().to_lowercase())
            .collect();
        self
    }

    pub fn with_exclude(mut self, patterns: &[String]) -> Self {
        self.exclude = patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid glob '{}': {}", p, e);
                    None
                }
            })
            .collect();
        self
    }

    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        let mut files = Vec::new();

        if !self.root.exists() {
            return Ok(files);
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false) // Security: prevent symlink traversal attacks
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let relative = self.relative(path);

            if self.should_exclude(&relative) || !self.check_extension(path) {
                continue;
            }

            if let Ok(metadata) = path.metadata() {
                if metadata.len() > MAX_FILE_SIZE {
                    continue;
                }

                files.push(ScannedFile {
                    path: path.to_path_buf(),
                    relative,
                    size: metadata.len(),
                });
            }
        }

        Ok(files)
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.base)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Whether a base-relative path matches any exclude glob
    pub fn should_exclude(&self, relative: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(relative))
    }

    fn check_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Path relative to the scanner base, `/`-separated
    pub relative: String,
    pub size: u64,
}
