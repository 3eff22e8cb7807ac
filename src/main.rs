use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsync::OutputFormat;
use docsync::agent::SyncMode;
use docsync::cli::commands;
use docsync::types::ChangeSeverity;

/// Parse sync mode from string
fn parse_sync_mode(s: &str) -> Result<SyncMode, String> {
    s.parse()
}

/// Parse output format from string
fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

/// Parse minimum severity from string
fn parse_severity(s: &str) -> Result<ChangeSeverity, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "docsync")]
#[command(
    version,
    about = "Keeps prose documentation in sync with a code API as the code evolves"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docsync in the current directory
    Init {
        #[arg(long, short, help = "Overwrite existing configuration")]
        force: bool,
    },

    /// Detect API changes and update the documentation that mentions them
    Sync {
        #[arg(
            long,
            short,
            default_value = "git",
            value_parser = parse_sync_mode,
            help = "Change source: git, files"
        )]
        mode: SyncMode,
        #[arg(long, help = "Revision to diff against (git mode, default HEAD)")]
        commit: Option<String>,
        #[arg(long, num_args = 1.., help = "Only consider these source files")]
        files: Vec<String>,
        #[arg(
            long,
            value_parser = parse_severity,
            help = "Skip changes below: patch, minor, major, breaking"
        )]
        min_severity: Option<ChangeSeverity>,
        #[arg(long, help = "LLM provider: claude-code, openai")]
        provider: Option<String>,
        #[arg(long, help = "LLM model override")]
        model: Option<String>,
        #[arg(long, short, help = "Approve every update without prompting")]
        yes: bool,
        #[arg(long, help = "Generate and review, but write nothing")]
        dry_run: bool,
        #[arg(long, short, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Show the API diff and severity between two versions of a source file
    Diff {
        old: PathBuf,
        new: PathBuf,
        #[arg(long, short, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// List documentation lines and code examples that mention a name
    Refs {
        name: String,
        #[arg(long, short, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, short, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdocsync encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { force } => {
            commands::init::run(force)?;
        }
        Commands::Sync {
            mode,
            commit,
            files,
            min_severity,
            provider,
            model,
            yes,
            dry_run,
            format,
        } => {
            let rt = Runtime::new()?;
            let success = rt.block_on(commands::sync::run(commands::sync::SyncOptions {
                mode,
                commit,
                files,
                min_severity,
                provider,
                model,
                yes,
                dry_run,
                format,
            }))?;
            if !success {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Diff { old, new, format } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::diff::run(&old, &new, format))?;
        }
        Commands::Refs { name, format } => {
            commands::refs::run(&name, format)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(format)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
