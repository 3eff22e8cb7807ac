//! Per-run pipeline state
//!
//! One [`PipelineState`] is created by every `run()` call and passed by
//! `&mut` through the phases. Nothing here outlives the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};

use crate::types::{
    AffectedDocumentation, ApiDiff, ChangeSeverity, CodeChange, DocUpdate, ReviewDecision,
    SessionId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    Detecting,
    Analyzing,
    Mapping,
    Generating,
    Reviewing,
    Applying,
    Complete,
}

impl AgentPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Detecting => "Detecting",
            Self::Analyzing => "Analyzing",
            Self::Mapping => "Mapping",
            Self::Generating => "Generating",
            Self::Reviewing => "Reviewing",
            Self::Applying => "Applying",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One recorded, non-fatal failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseError {
    pub phase: AgentPhase,
    /// File the failure is about, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<String>,
    pub message: String,
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "[{}] {}: {}", self.phase, target, self.message),
            None => write!(f, "[{}] {}", self.phase, self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub files_analyzed: usize,
    pub apis_changed: usize,
    pub docs_updated: usize,
    pub elapsed_ms: u64,
}

/// API diff of one changed source file
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub file_path: String,
    pub diff: ApiDiff,
    pub severity: ChangeSeverity,
}

#[derive(Debug)]
pub struct PipelineState {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub phase: AgentPhase,
    pub changes: Vec<CodeChange>,
    pub diffs: Vec<FileDiff>,
    pub affected: AffectedDocumentation,
    pub updates: Vec<DocUpdate>,
    pub decisions: Vec<ReviewDecision>,
    /// Paths written during the apply phase
    pub applied: Vec<String>,
    pub errors: Vec<PhaseError>,
    pub metrics: PipelineMetrics,
    clock: Instant,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            session_id: SessionId::generate(),
            started_at: Utc::now(),
            phase: AgentPhase::Detecting,
            changes: Vec::new(),
            diffs: Vec::new(),
            affected: AffectedDocumentation::new(),
            updates: Vec::new(),
            decisions: Vec::new(),
            applied: Vec::new(),
            errors: Vec::new(),
            metrics: PipelineMetrics::default(),
            clock: Instant::now(),
        }
    }

    pub fn enter(&mut self, phase: AgentPhase) {
        info!("Phase {}: {}", phase as u8 + 1, phase);
        self.phase = phase;
    }

    /// Record a failure against the current phase
    pub fn record_error(&mut self, target: Option<&str>, message: impl Into<String>) {
        let error = PhaseError {
            phase: self.phase,
            target: target.map(str::to_string),
            message: message.into(),
        };
        warn!("{}", error);
        self.errors.push(error);
    }

    pub fn finish(&mut self) {
        self.metrics.elapsed_ms = self.clock.elapsed().as_millis() as u64;
        self.phase = AgentPhase::Complete;
    }
}
