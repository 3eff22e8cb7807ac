//! Init Command
//!
//! Initialize docsync in the current directory.

use std::path::Path;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::constants::PROJECT_DIR;
use crate::types::{DocSyncError, Result};

pub fn run(force: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    run_in(&root, force)?;

    let out = Output::new();
    out.success(&format!("Initialized docsync in {}/", PROJECT_DIR));
    println!();
    println!("Next steps:");
    println!(
        "  1. Point [paths] in {}/config.toml at your docs and sources",
        PROJECT_DIR
    );
    println!("  2. Run 'docsync sync --dry-run' to preview documentation updates");
    Ok(())
}

fn run_in(root: &Path, force: bool) -> Result<()> {
    if ConfigLoader::init_project(root, force)?.is_none() {
        return Err(DocSyncError::Config(
            "Already initialized. Use --force to overwrite.".to_string(),
        ));
    }

    // An existing global config is left untouched
    if let Err(e) = ConfigLoader::init_global(false) {
        tracing::debug!("Global config init skipped: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONFIG_FILE;
    use tempfile::TempDir;

    #[test]
    fn test_second_init_requires_force() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join(PROJECT_DIR).join(CONFIG_FILE);

        ConfigLoader::init_project(dir.path(), false).unwrap();
        std::fs::write(&config, "version = \"custom\"\n").unwrap();

        assert!(matches!(
            run_in(dir.path(), false),
            Err(DocSyncError::Config(_))
        ));
        assert_eq!(
            std::fs::read_to_string(&config).unwrap(),
            "version = \"custom\"\n"
        );
    }
}
