//! Refs Command
//!
//! Every documentation line and code example that mentions a name.

use console::style;
use serde::Serialize;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::docs::{DocumentationIndex, ReferenceFinder};
use crate::types::{ApiElement, CodeExample, DocReference, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefsReport {
    pub name: String,
    pub files_indexed: usize,
    pub references: Vec<DocReference>,
    pub examples: Vec<CodeExample>,
}

pub fn run(name: &str, format: OutputFormat) -> Result<()> {
    let ctx = CommandContext::load()?;
    let report = build_report(&ctx, name)?;
    let out = Output::new();

    if format.is_json() {
        return out.json(&report);
    }
    print_report(&out, &report);
    Ok(())
}

fn build_report(ctx: &CommandContext, name: &str) -> Result<RefsReport> {
    let config = &ctx.config;
    let index = DocumentationIndex::initialize(
        &ctx.repo_root,
        &config.paths.docs,
        &config.ignore,
        config.doc_format,
    )?;

    // Lookups only use the name
    let element = ApiElement::function(name);
    let finder = ReferenceFinder::new(&index);

    Ok(RefsReport {
        name: name.to_string(),
        files_indexed: index.len(),
        references: finder.find_references(&element),
        examples: finder.find_code_examples(&element),
    })
}

fn print_report(out: &Output, report: &RefsReport) {
    out.header(&format!("References to `{}`", report.name));
    out.field("Files indexed", report.files_indexed);

    if report.references.is_empty() && report.examples.is_empty() {
        out.warning("No documentation mentions this name");
        return;
    }

    out.section(&format!("Lines ({})", report.references.len()));
    for reference in &report.references {
        println!(
            "{}",
            style(format!("{}:{}", reference.file_path, reference.line_number)).cyan()
        );
        for line in reference.context.lines() {
            println!("  {}", line);
        }
    }

    if !report.examples.is_empty() {
        out.section(&format!("Code examples ({})", report.examples.len()));
        for example in &report.examples {
            let language = if example.language.is_empty() {
                "text"
            } else {
                example.language.as_str()
            };
            out.item(
                "•",
                &format!(
                    "{}:{}-{} ({})",
                    example.file_path, example.start_line, example.end_line, language
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_report_collects_lines_and_examples() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("docs/guide.md"),
            "# Guide\n\nCall `connect` first.\n\n```ts\nconst c = connect();\n```\n\nconnector is different.\n",
        )
        .unwrap();

        let ctx = CommandContext {
            repo_root: dir.path().to_path_buf(),
            config: Config::default(),
        };
        let report = build_report(&ctx, "connect").unwrap();

        assert_eq!(report.files_indexed, 1);
        let lines: Vec<usize> = report.references.iter().map(|r| r.line_number).collect();
        assert_eq!(lines, vec![3, 6]);
        assert_eq!(report.examples.len(), 1);
        assert_eq!(report.examples[0].language, "ts");
    }
}
