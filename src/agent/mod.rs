//! Documentation Sync Agent
//!
//! Six-phase pipeline that turns code changes into reviewed documentation
//! edits:
//!
//! ```text
//! Detect → Analyze → (severity filter) → Map → Generate → Review → Apply
//! ```
//!
//! 1. **Detect**: collect [`CodeChange`]s from git or a file list
//! 2. **Analyze**: parse old/new sources and diff their API surfaces
//! 3. **Map**: find documentation that references changed elements
//! 4. **Generate**: ask the generator for updated text per affected file
//! 5. **Review**: let the review surface approve, reject or edit each update
//! 6. **Apply**: back up and overwrite approved files (skipped in dry-run)
//!
//! Every phase records per-item failures in the [`PipelineState`] and moves
//! on. Only an error that escapes those guards (change detection failing,
//! for instance) makes the run unsuccessful.

mod apply;
mod state;

pub use apply::{backup_path, write_with_backup};
pub use state::{AgentPhase, FileDiff, PhaseError, PipelineMetrics, PipelineState};

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::ai::{DocGenerator, GenerationContext, LlmDocGenerator, ProviderConfig, create_provider};
use crate::analyzer::DiffEngine;
use crate::analyzer::parser::{ApiParser, TreeSitterApiParser};
use crate::config::Config;
use crate::detect::{ChangeDetector, ChangeTarget, FileChangeDetector, GitChangeDetector};
use crate::docs::{DocumentationIndex, map_affected_docs};
use crate::review::{AutoApproveReviewer, ConsoleReviewer, DecisionLog, ReviewSurface};
use crate::types::{
    AffectedDocumentation, ApiDiff, ChangeType, CodeChange, DocUpdate, Result, ReviewDecision,
    SessionId,
};

// =============================================================================
// Input / Output
// =============================================================================

/// Where code changes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Working tree against a commit
    #[default]
    Git,
    /// Explicit file list, or every file under the code roots
    Files,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => f.write_str("git"),
            Self::Files => f.write_str("files"),
        }
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "files" => Ok(Self::Files),
            _ => Err(format!("Invalid mode '{}'. Valid values: git, files", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentInput {
    pub mode: SyncMode,
    pub target: Option<ChangeTarget>,
    pub config: Config,
    pub dry_run: bool,
    /// Code roots, documentation roots and the decision log resolve against this
    pub repo_root: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    pub success: bool,
    pub updates_generated: usize,
    pub updates_applied: usize,
    pub errors: Vec<PhaseError>,
    pub summary: String,
    pub metrics: PipelineMetrics,
    pub session_id: SessionId,
}

impl AgentResult {
    fn from_state(state: PipelineState, success: bool, summary: String) -> Self {
        Self {
            success,
            updates_generated: state.updates.len(),
            updates_applied: state.applied.len(),
            errors: state.errors,
            summary,
            metrics: state.metrics,
            session_id: state.session_id,
        }
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn completion_summary(state: &PipelineState) -> String {
    format!(
        "Generated {}, applied {} ({}, {}, {}).",
        plural(
            state.updates.len(),
            "documentation update",
            "documentation updates"
        ),
        state.applied.len(),
        plural(
            state.metrics.files_analyzed,
            "file analyzed",
            "files analyzed"
        ),
        plural(state.metrics.apis_changed, "API change", "API changes"),
        plural(state.errors.len(), "error", "errors"),
    )
}

// =============================================================================
// Agent
// =============================================================================

/// Orchestrates one documentation sync per [`DocSyncAgent::run`] call.
///
/// Collaborators default to the concrete implementations chosen by the
/// run's configuration; the `with_*` methods replace them.
#[derive(Default)]
pub struct DocSyncAgent {
    detector: Option<Arc<dyn ChangeDetector>>,
    parser: Option<Arc<dyn ApiParser>>,
    generator: Option<Arc<dyn DocGenerator>>,
    reviewer: Option<Arc<dyn ReviewSurface>>,
    decision_log: Option<DecisionLog>,
}

impl DocSyncAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(mut self, detector: Arc<dyn ChangeDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn ApiParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn DocGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_reviewer(mut self, reviewer: Arc<dyn ReviewSurface>) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    pub fn with_decision_log(mut self, log: DecisionLog) -> Self {
        self.decision_log = Some(log);
        self
    }

    fn detector(&self, input: &AgentInput) -> Arc<dyn ChangeDetector> {
        if let Some(detector) = &self.detector {
            return detector.clone();
        }
        let config = &input.config;
        match input.mode {
            SyncMode::Git => Arc::new(GitChangeDetector::new(
                &input.repo_root,
                &config.paths.code,
                &config.ignore,
            )),
            SyncMode::Files => Arc::new(FileChangeDetector::new(
                &input.repo_root,
                &config.paths.code,
                &config.ignore,
            )),
        }
    }

    fn parser(&self) -> Arc<dyn ApiParser> {
        self.parser
            .clone()
            .unwrap_or_else(|| Arc::new(TreeSitterApiParser::new()))
    }

    fn generator(&self, config: &Config) -> Result<Arc<dyn DocGenerator>> {
        if let Some(generator) = &self.generator {
            return Ok(generator.clone());
        }
        let provider = create_provider(&ProviderConfig::from(&config.llm))?;
        Ok(Arc::new(LlmDocGenerator::new(
            provider,
            config.llm.max_retries,
        )))
    }

    fn reviewer(&self, config: &Config) -> Arc<dyn ReviewSurface> {
        if let Some(reviewer) = &self.reviewer {
            return reviewer.clone();
        }
        if config.review.auto_approve {
            Arc::new(AutoApproveReviewer::new())
        } else {
            Arc::new(ConsoleReviewer::new())
        }
    }

    fn decision_log(&self, input: &AgentInput) -> DecisionLog {
        self.decision_log.clone().unwrap_or_else(|| {
            DecisionLog::new(input.repo_root.join(&input.config.review.decision_log))
        })
    }

    /// Run the full pipeline once. Never returns an error: failures are
    /// reported through [`AgentResult::success`] and [`AgentResult::errors`].
    #[instrument(skip(self, input), fields(mode = %input.mode, dry_run = input.dry_run))]
    pub async fn run(&self, input: AgentInput) -> AgentResult {
        let mut state = PipelineState::new();
        info!("Documentation sync started (session {})", state.session_id);

        let outcome = self.execute(&input, &mut state).await;
        if let Err(e) = &outcome {
            state.record_error(None, e.to_string());
        }
        state.finish();

        match outcome {
            Ok(summary) => {
                info!("{}", summary);
                AgentResult::from_state(state, true, summary)
            }
            Err(e) => AgentResult::from_state(
                state,
                false,
                format!("Documentation sync failed: {}", e),
            ),
        }
    }

    /// Phases in order; `Ok` carries the summary, including early exits
    async fn execute(&self, input: &AgentInput, state: &mut PipelineState) -> Result<String> {
        // ===== PHASE 1: Detect =====
        state.enter(AgentPhase::Detecting);
        state.changes = self
            .detector(input)
            .detect(input.target.as_ref())
            .await?;
        if state.changes.is_empty() {
            return Ok("No code changes detected.".to_string());
        }
        info!("{} changed file(s)", state.changes.len());

        // ===== PHASE 2: Analyze =====
        state.enter(AgentPhase::Analyzing);
        self.analyze(state).await;

        let min_severity = input.config.min_severity;
        let before = state.diffs.len();
        state.diffs.retain(|d| d.severity >= min_severity);
        debug!(
            "{} of {} file diff(s) meet the {} threshold",
            state.diffs.len(),
            before,
            min_severity
        );
        if state.diffs.is_empty() {
            return Ok(format!(
                "No changes meet the minimum severity threshold ({}).",
                min_severity
            ));
        }

        // ===== PHASE 3: Map =====
        state.enter(AgentPhase::Mapping);
        let mut merged = ApiDiff::default();
        for file_diff in &state.diffs {
            merged.merge(file_diff.diff.clone());
        }
        state.affected = self.map(input, &merged, state);
        for element in &state.affected.missing_docs {
            warn!(
                "Public {} `{}` changed but is not documented",
                element.kind, element.name
            );
        }
        if state.affected.is_empty() {
            return Ok("No documentation files affected by API changes.".to_string());
        }
        info!(
            "{} documentation file(s) affected ({} reference(s))",
            state.affected.file_count(),
            state.affected.total_references
        );

        // ===== PHASE 4: Generate =====
        state.enter(AgentPhase::Generating);
        let generator = self.generator(&input.config)?;
        let context = GenerationContext {
            diff: &merged,
            severity: DiffEngine::calculate_severity(&merged),
            doc_format: input.config.doc_format,
        };
        let docs = state.affected.files().to_vec();
        for doc in &docs {
            match generator.generate(doc, &context).await {
                Ok(generated) => state.updates.push(DocUpdate {
                    file_path: doc.path.clone(),
                    original_content: doc.content.clone(),
                    updated_content: generated.updated_content,
                    reasoning: generated.reasoning,
                }),
                Err(e) => state.record_error(Some(&doc.path), e.to_string()),
            }
        }
        if state.updates.is_empty() {
            return Ok(completion_summary(state));
        }

        // ===== PHASE 5: Review =====
        state.enter(AgentPhase::Reviewing);
        self.review(input, state).await;

        // ===== PHASE 6: Apply =====
        if input.dry_run {
            info!(
                "Dry run: skipping writes for {} update(s)",
                state.updates.len()
            );
        } else {
            state.enter(AgentPhase::Applying);
            self.apply(input, state).await;
        }

        Ok(completion_summary(state))
    }

    async fn analyze(&self, state: &mut PipelineState) {
        let parser = self.parser();
        let changes = std::mem::take(&mut state.changes);

        for change in &changes {
            match analyze_change(parser.as_ref(), change).await {
                Ok(diff) => {
                    let severity = DiffEngine::calculate_severity(&diff);
                    debug!(
                        "{} ({}): {} API change(s), {}",
                        change.file_path,
                        change.change_type,
                        diff.change_count(),
                        severity
                    );
                    state.metrics.files_analyzed += 1;
                    state.metrics.apis_changed += diff.change_count();
                    state.diffs.push(FileDiff {
                        file_path: change.file_path.clone(),
                        diff,
                        severity,
                    });
                }
                Err(e) => state.record_error(Some(&change.file_path), e.to_string()),
            }
        }

        state.changes = changes;
    }

    fn map(
        &self,
        input: &AgentInput,
        merged: &ApiDiff,
        state: &mut PipelineState,
    ) -> AffectedDocumentation {
        let config = &input.config;
        match DocumentationIndex::initialize(
            &input.repo_root,
            &config.paths.docs,
            &config.ignore,
            config.doc_format,
        ) {
            Ok(index) => map_affected_docs(&index, merged),
            Err(e) => {
                state.record_error(None, format!("Failed to index documentation: {}", e));
                AffectedDocumentation::new()
            }
        }
    }

    async fn review(&self, input: &AgentInput, state: &mut PipelineState) {
        let reviewer = self.reviewer(&input.config);
        let mut decisions = match reviewer.review(&state.updates).await {
            Ok(decisions) => decisions,
            Err(e) => {
                state.record_error(None, e.to_string());
                Vec::new()
            }
        };

        if decisions.len() < state.updates.len() {
            debug!(
                "{} update(s) without a decision are rejected",
                state.updates.len() - decisions.len()
            );
            decisions.resize(state.updates.len(), ReviewDecision::reject(None));
        }
        decisions.truncate(state.updates.len());

        let log = self.decision_log(input);
        for (update, decision) in state.updates.iter().zip(&decisions) {
            debug!("{}: {}", update.file_path, decision.action);
            log.append(update, decision).await;
        }
        state.decisions = decisions;
    }

    async fn apply(&self, input: &AgentInput, state: &mut PipelineState) {
        let mut failures = Vec::new();
        let mut applied = Vec::new();

        for (update, decision) in state.updates.iter().zip(&state.decisions) {
            let Some(content) = decision.content_for(update) else {
                continue;
            };
            let path = input.repo_root.join(&update.file_path);
            match write_with_backup(&path, content).await {
                Ok(_) => {
                    info!("Updated {}", update.file_path);
                    applied.push(update.file_path.clone());
                }
                Err(e) => failures.push((update.file_path.clone(), e.to_string())),
            }
        }

        for (path, message) in failures {
            state.record_error(Some(&path), message);
        }
        state.metrics.docs_updated = applied.len();
        state.applied = applied;
    }
}

/// API diff for one change; pure additions and deletions skip the comparison
async fn analyze_change(parser: &dyn ApiParser, change: &CodeChange) -> Result<ApiDiff> {
    let path = change.file_path.as_str();
    let language = change.language;

    match (change.change_type, change.previous_content.as_deref()) {
        (ChangeType::Deleted, Some(previous)) => {
            let old = parser.parse(path, previous, language).await?;
            Ok(ApiDiff::all_removed(old.apis))
        }
        (ChangeType::Deleted, None) => Ok(ApiDiff::default()),
        (ChangeType::Modified, Some(previous)) => {
            let new = parser.parse(path, &change.content, language).await?;
            let old = parser.parse(path, previous, language).await?;
            Ok(DiffEngine::analyze(&old.apis, &new.apis))
        }
        (ChangeType::Added, _) | (ChangeType::Modified, None) => {
            let new = parser.parse(path, &change.content, language).await?;
            Ok(ApiDiff::all_added(new.apis))
        }
    }
}
