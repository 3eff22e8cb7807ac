//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/docsync/config.toml)
//! 3. Project config (.docsync/config.toml)
//! 4. Environment variables (DOCSYNC_* prefix, `__` between nesting levels)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::constants::{CONFIG_FILE, ENV_PREFIX, PROJECT_DIR};
use crate::types::{DocSyncError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory
    pub fn load() -> Result<Config> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load_from(project_root: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path_in(project_root);
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // DOCSYNC_LLM__MODEL -> llm.model, DOCSYNC_MIN_SEVERITY -> min_severity
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| DocSyncError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DocSyncError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/docsync/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("docsync"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_config_path_in(Path::new("."))
    }

    fn project_config_path_in(root: &Path) -> PathBuf {
        root.join(PROJECT_DIR).join(CONFIG_FILE)
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(PROJECT_DIR)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            DocSyncError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join(CONFIG_FILE);
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_global_config())?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Initialize project configuration under `root`.
    ///
    /// Returns `None` when a config already exists and `force` is not set.
    pub fn init_project(root: &Path, force: bool) -> Result<Option<PathBuf>> {
        let project_dir = root.join(PROJECT_DIR);
        fs::create_dir_all(&project_dir)?;

        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() && !force {
            return Ok(None);
        }

        fs::write(&config_path, Self::default_project_config())?;
        info!("Created project config: {}", config_path.display());
        Ok(Some(config_path))
    }

    /// Check if project is initialized
    pub fn is_project_initialized(root: &Path) -> bool {
        Self::project_config_path_in(root).exists()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_global_config() -> String {
        r#"# docsync Global Configuration
# User-wide defaults. Project settings in .docsync/config.toml override these.

version = "1.0"

[llm]
provider = "claude-code"
model = "claude-sonnet-4-20250514"
timeout_secs = 300
max_retries = 3
"#
        .to_string()
    }

    fn default_project_config() -> String {
        r#"# docsync Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

# Skip diffs below this severity: patch | minor | major | breaking
min_severity = "patch"

# markdown | restructuredtext | asciidoc | plaintext
doc_format = "markdown"

ignore = [
    "node_modules/**",
    "target/**",
    "dist/**",
    ".git/**",
]

[paths]
docs = ["docs", "README.md"]
code = ["src"]

[review]
auto_approve = false
decision_log = ".docsync/decisions.json"
"#
        .to_string()
    }
}
