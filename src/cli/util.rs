//! CLI Common Utilities
//!
//! Shared context loading and argument parsing for CLI commands.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{Config, ConfigLoader};
use crate::constants::PROJECT_DIR;
use crate::types::{DocSyncError, Result};

/// Output format shared by every command that prints results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format '{}'. Valid values: text, json", s)),
        }
    }
}

/// Command execution context
///
/// Repository root plus the configuration resolved for it.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub repo_root: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// Load context for the current directory.
    ///
    /// A missing `.docsync/` is fine: defaults, global config and env still apply.
    pub fn load() -> Result<Self> {
        let repo_root = std::env::current_dir()?;
        Self::load_from(repo_root)
    }

    pub fn load_from(repo_root: PathBuf) -> Result<Self> {
        let config = ConfigLoader::load_from(&repo_root)?;
        Ok(Self { repo_root, config })
    }
}

/// Require `.docsync/` under `root`
///
/// Returns the directory path, or `DocSyncError::NotInitialized` if absent.
pub fn require_initialized(root: &Path) -> Result<PathBuf> {
    let dir = root.join(PROJECT_DIR);
    if !dir.exists() {
        return Err(DocSyncError::NotInitialized);
    }
    Ok(dir)
}

pub fn is_initialized(root: &Path) -> bool {
    root.join(PROJECT_DIR).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_require_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            require_initialized(dir.path()),
            Err(DocSyncError::NotInitialized)
        ));
        assert!(!is_initialized(dir.path()));

        ConfigLoader::init_project(dir.path(), false).unwrap();
        assert!(is_initialized(dir.path()));
        assert_eq!(
            require_initialized(dir.path()).unwrap(),
            dir.path().join(PROJECT_DIR)
        );
    }

    #[test]
    fn test_context_reads_project_config() {
        let dir = TempDir::new().unwrap();
        ConfigLoader::init_project(dir.path(), false).unwrap();

        let ctx = CommandContext::load_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(ctx.repo_root, dir.path());
        assert_eq!(ctx.config.paths.code, vec!["src".to_string()]);
    }
}
