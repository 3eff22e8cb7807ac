//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Project data directory, relative to the repository root
pub const PROJECT_DIR: &str = ".docsync";

/// Config file name inside the global and project directories
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable prefix for config overrides
pub const ENV_PREFIX: &str = "DOCSYNC_";

/// Suffix appended to a documentation file's path for its pre-write copy
pub const BACKUP_SUFFIX: &str = ".backup";

/// Retry constants for documentation generation
pub mod retry {
    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Prompt sizing for documentation generation
pub mod prompt {
    /// Documentation content beyond this many characters is truncated in prompts
    pub const MAX_DOC_CHARS: usize = 60_000;

    /// Maximum number of changed elements listed per prompt
    pub const MAX_CHANGES: usize = 50;
}

/// Git change detection
pub mod git {
    /// Revision compared against when no commit is given
    pub const DEFAULT_TARGET: &str = "HEAD";
}
