//! Diff Command
//!
//! API diff and severity between two versions of one source file.

use console::style;
use serde::Serialize;
use std::path::Path;

use crate::analyzer::DiffEngine;
use crate::analyzer::parser::{ApiParser, Language, TreeSitterApiParser};
use crate::cli::ui::Output;
use crate::cli::util::OutputFormat;
use crate::types::{ApiDiff, ApiElement, ChangeSeverity, DocSyncError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub old_file: String,
    pub new_file: String,
    pub language: Language,
    pub severity: ChangeSeverity,
    pub public_api_change: bool,
    pub diff: ApiDiff,
}

pub async fn run(old: &Path, new: &Path, format: OutputFormat) -> Result<()> {
    let report = build_report(old, new).await?;
    let out = Output::new();

    if format.is_json() {
        return out.json(&report);
    }
    print_report(&out, &report);
    Ok(())
}

async fn build_report(old: &Path, new: &Path) -> Result<DiffReport> {
    let language = Language::from_path(new);
    if !language.has_parser_support() {
        return Err(DocSyncError::parse(
            new.display().to_string(),
            format!("No parser support for language: {}", language),
        ));
    }

    let old_source = tokio::fs::read_to_string(old).await?;
    let new_source = tokio::fs::read_to_string(new).await?;

    let parser = TreeSitterApiParser::new();
    let old_file = old.display().to_string();
    let new_file = new.display().to_string();
    let before = parser.parse(&old_file, &old_source, language).await?;
    let after = parser.parse(&new_file, &new_source, language).await?;

    let diff = DiffEngine::analyze(&before.apis, &after.apis);
    Ok(DiffReport {
        old_file,
        new_file,
        language,
        severity: DiffEngine::calculate_severity(&diff),
        public_api_change: DiffEngine::is_public_api_change(&diff),
        diff,
    })
}

fn print_report(out: &Output, report: &DiffReport) {
    out.header(&format!("{} → {}", report.old_file, report.new_file));
    out.field("Language", report.language);
    out.field("Severity", severity_style(report.severity));
    out.field("Public change", report.public_api_change);

    let diff = &report.diff;
    if diff.is_empty() {
        out.info(&format!(
            "No API changes ({} unchanged)",
            diff.unchanged.len()
        ));
        return;
    }

    if !diff.added.is_empty() {
        out.section(&format!("Added ({})", diff.added.len()));
        for element in &diff.added {
            out.item(&style("+").green().to_string(), &describe(element));
        }
    }

    if !diff.removed.is_empty() {
        out.section(&format!("Removed ({})", diff.removed.len()));
        for element in &diff.removed {
            out.item(&style("-").red().to_string(), &describe(element));
        }
    }

    if !diff.modified.is_empty() {
        out.section(&format!("Modified ({})", diff.modified.len()));
        for modified in &diff.modified {
            out.item(&style("~").yellow().to_string(), &describe(&modified.new));
            for change in &modified.changes {
                println!("      {}", style(&change.description).dim());
            }
        }
    }
}

fn describe(element: &ApiElement) -> String {
    let visibility = if element.is_public { "" } else { " (private)" };
    if element.signature.is_empty() {
        format!("{} {}{}", element.kind, element.name, visibility)
    } else {
        format!("{} `{}`{}", element.kind, element.signature, visibility)
    }
}

fn severity_style(severity: ChangeSeverity) -> String {
    let text = style(severity.as_str());
    match severity {
        ChangeSeverity::Breaking => text.red().bold().to_string(),
        ChangeSeverity::Major => text.yellow().to_string(),
        ChangeSeverity::Minor => text.cyan().to_string(),
        ChangeSeverity::Patch => text.dim().to_string(),
    }
}
