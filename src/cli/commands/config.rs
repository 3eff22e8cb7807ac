//! Config Command
//!
//! Inspect and initialize docsync configuration.
//!
//! Usage:
//!   docsync config show [--format json]
//!   docsync config path
//!   docsync config init [--global] [--force]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::config::{Config, ConfigLoader};
use crate::types::{DocSyncError, Result};

/// Show the merged effective configuration
pub fn show(format: OutputFormat) -> Result<()> {
    let ctx = CommandContext::load()?;
    println!("{}", render(&ctx.config, format)?);
    Ok(())
}

fn render(config: &Config, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Text => {
            toml::to_string_pretty(config).map_err(|e| DocSyncError::Config(e.to_string()))
        }
    }
}

/// Show configuration file paths
pub fn path() -> Result<()> {
    let out = Output::new();
    let status = |exists: bool| if exists { "" } else { " (not found)" };

    match ConfigLoader::global_config_path() {
        Some(global) => out.field(
            "Global",
            format!("{}{}", global.display(), status(global.exists())),
        ),
        None => out.field("Global", "cannot determine config directory"),
    }

    let project = ConfigLoader::project_config_path();
    out.field(
        "Project",
        format!("{}{}", project.display(), status(project.exists())),
    );
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();

    if global {
        let path = ConfigLoader::init_global(force)?;
        out.success("Initialized global configuration");
        out.field("Config", path.display());
        return Ok(());
    }

    let root = std::env::current_dir()?;
    match ConfigLoader::init_project(&root, force)? {
        Some(path) => {
            out.success("Initialized project configuration");
            out.field("Config", path.display());
        }
        None => out.warning("Project config already exists. Use --force to overwrite."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_is_toml() {
        let text = render(&Config::default(), OutputFormat::Text).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.paths.docs, Config::default().paths.docs);
        assert!(text.contains("[llm]"));
    }

    #[test]
    fn test_render_json() {
        let json = render(&Config::default(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["min_severity"], "patch");
        assert_eq!(value["review"]["auto_approve"], false);
    }
}
