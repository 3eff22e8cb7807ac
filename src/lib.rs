//! docsync - Documentation Sync Agent
//!
//! Keeps prose documentation consistent with a code API as the code evolves.
//! Changed source files are parsed into API surfaces, diffed, classified by
//! severity and mapped to the documentation that mentions them; an LLM then
//! proposes updated text that a reviewer approves, rejects or edits before
//! anything is written.
//!
//! ## Quick Start
//!
//! ```ignore
//! use docsync::{AgentInput, Config, DocSyncAgent, SyncMode};
//!
//! let result = DocSyncAgent::new()
//!     .run(AgentInput {
//!         mode: SyncMode::Git,
//!         target: None,
//!         config: Config::default(),
//!         dry_run: true,
//!         repo_root: std::env::current_dir()?,
//!     })
//!     .await;
//! println!("{}", result.summary);
//! ```
//!
//! ## Modules
//!
//! - [`agent`]: six-phase orchestrator and per-run state
//! - [`analyzer`]: tree-sitter API extraction and the diff engine
//! - [`docs`]: documentation index, reference finder and aggregator
//! - [`detect`]: git and file-list change detection
//! - [`ai`]: LLM providers, prompts and the documentation generator
//! - [`review`]: review surfaces and the decision log
//! - [`config`]: layered configuration

pub mod agent;
pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod detect;
pub mod docs;
pub mod review;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, DocFormat};

// Error Types
pub use types::error::{DocSyncError, ErrorCategory, Result};

// CLI
pub use cli::OutputFormat;

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use agent::{AgentInput, AgentPhase, AgentResult, DocSyncAgent, PhaseError, SyncMode};
pub use detect::{ChangeDetector, ChangeTarget, FileChangeDetector, GitChangeDetector};
pub use review::{AutoApproveReviewer, ConsoleReviewer, DecisionLog, ReviewSurface};

// =============================================================================
// Analysis Re-exports
// =============================================================================

pub use analyzer::DiffEngine;
pub use analyzer::parser::{ApiParser, Language, TreeSitterApiParser};
pub use docs::{DocumentationIndex, ReferenceFinder, map_affected_docs};
pub use types::{
    AffectedDocumentation, ApiDiff, ApiElement, ChangeSeverity, CodeChange, DocFile, DocUpdate,
    ReviewDecision,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{DocGenerator, LlmDocGenerator, LlmProvider, ProviderConfig, create_provider};
