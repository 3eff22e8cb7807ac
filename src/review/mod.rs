//! Review Surface
//!
//! Decides which generated updates get written:
//! - [`ConsoleReviewer`]: interactive approve / reject / edit
//! - [`AutoApproveReviewer`]: approves everything (CI)
//!
//! Decisions are recorded by [`DecisionLog`].

mod console;
mod log;

pub use console::ConsoleReviewer;
pub use log::{DecisionLog, DecisionLogEntry};

use async_trait::async_trait;
use tracing::info;

use crate::types::{DocUpdate, Result, ReviewDecision};

/// Produces one decision per update, in order.
///
/// A shorter response leaves the trailing updates undecided; the agent
/// treats those as rejected.
#[async_trait]
pub trait ReviewSurface: Send + Sync {
    async fn review(&self, updates: &[DocUpdate]) -> Result<Vec<ReviewDecision>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApproveReviewer;

impl AutoApproveReviewer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReviewSurface for AutoApproveReviewer {
    async fn review(&self, updates: &[DocUpdate]) -> Result<Vec<ReviewDecision>> {
        info!("Auto-approving {} update(s)", updates.len());
        Ok(updates.iter().map(|_| ReviewDecision::approve()).collect())
    }
}
