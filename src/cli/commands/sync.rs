//! Sync Command
//!
//! Run the documentation sync agent against the current repository.

use console::style;

use crate::agent::{AgentInput, AgentResult, DocSyncAgent, SyncMode};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::config::Config;
use crate::detect::ChangeTarget;
use crate::types::{ChangeSeverity, Result};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub mode: SyncMode,
    pub commit: Option<String>,
    pub files: Vec<String>,
    pub min_severity: Option<ChangeSeverity>,
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Approve every generated update without prompting
    pub yes: bool,
    pub dry_run: bool,
    pub format: OutputFormat,
}

impl SyncOptions {
    /// Command-line flags win over every config layer
    fn apply_to(&self, config: &mut Config) {
        if let Some(severity) = self.min_severity {
            config.min_severity = severity;
        }
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if self.yes {
            config.review.auto_approve = true;
        }
    }

    /// Explicit files take precedence over a commit
    fn target(&self) -> Option<ChangeTarget> {
        if !self.files.is_empty() {
            Some(ChangeTarget::Files(self.files.clone()))
        } else {
            self.commit.clone().map(ChangeTarget::Commit)
        }
    }
}

/// Returns whether the run succeeded
pub async fn run(options: SyncOptions) -> Result<bool> {
    let ctx = CommandContext::load()?;
    let input = build_input(ctx, &options)?;

    let out = Output::new();
    if options.format == OutputFormat::Text {
        out.header("Documentation Sync");
        out.field("Mode", input.mode);
        if let Some(target) = &input.target {
            out.field("Target", describe_target(target));
        }
        out.field("Min severity", input.config.min_severity);
        if input.dry_run {
            out.info("Dry run: no files will be written");
        }
    }

    let result = DocSyncAgent::new().run(input).await;

    if options.format.is_json() {
        out.json(&result)?;
    } else {
        print_result(&out, &result);
    }
    Ok(result.success)
}

fn build_input(ctx: CommandContext, options: &SyncOptions) -> Result<AgentInput> {
    let mut config = ctx.config;
    options.apply_to(&mut config);
    config.validate()?;

    Ok(AgentInput {
        mode: options.mode,
        target: options.target(),
        config,
        dry_run: options.dry_run,
        repo_root: ctx.repo_root,
    })
}

fn describe_target(target: &ChangeTarget) -> String {
    match target {
        ChangeTarget::Commit(rev) => rev.clone(),
        ChangeTarget::Files(files) => format!("{} file(s)", files.len()),
    }
}

fn print_result(out: &Output, result: &AgentResult) {
    println!();
    if result.success {
        out.success(&result.summary);
    } else {
        out.error(&result.summary);
    }

    if !result.errors.is_empty() {
        out.section(&format!("Errors ({})", result.errors.len()));
        for error in &result.errors {
            out.item(&style("✗").red().to_string(), &error.to_string());
        }
    }

    let metrics = &result.metrics;
    println!();
    out.field("Session", &result.session_id);
    out.field("Files analyzed", metrics.files_analyzed);
    out.field("API changes", metrics.apis_changed);
    out.field("Docs updated", metrics.docs_updated);
    out.field("Elapsed", format!("{} ms", metrics.elapsed_ms));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn context() -> CommandContext {
        CommandContext {
            repo_root: PathBuf::from("/repo"),
            config: Config::default(),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let options = SyncOptions {
            mode: SyncMode::Files,
            min_severity: Some(ChangeSeverity::Major),
            provider: Some("openai".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            yes: true,
            dry_run: true,
            ..Default::default()
        };

        let input = build_input(context(), &options).unwrap();

        assert_eq!(input.mode, SyncMode::Files);
        assert_eq!(input.config.min_severity, ChangeSeverity::Major);
        assert_eq!(input.config.llm.provider, "openai");
        assert_eq!(input.config.llm.model, "gpt-4o-mini");
        assert!(input.config.review.auto_approve);
        assert!(input.dry_run);
        assert_eq!(input.repo_root, PathBuf::from("/repo"));
    }

    #[test]
    fn test_files_win_over_commit() {
        let options = SyncOptions {
            commit: Some("HEAD~1".to_string()),
            files: vec!["src/a.ts".to_string()],
            ..Default::default()
        };
        assert!(matches!(options.target(), Some(ChangeTarget::Files(f)) if f == ["src/a.ts"]));

        let options = SyncOptions {
            commit: Some("HEAD~1".to_string()),
            ..Default::default()
        };
        assert!(matches!(options.target(), Some(ChangeTarget::Commit(rev)) if rev == "HEAD~1"));
        assert!(SyncOptions::default().target().is_none());
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let input = build_input(context(), &SyncOptions::default()).unwrap();
        assert_eq!(input.config.min_severity, ChangeSeverity::Patch);
        assert!(!input.config.review.auto_approve);
        assert!(input.target.is_none());
    }
}
