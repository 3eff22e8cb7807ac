use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::{DocUpdate, ReviewAction, ReviewDecision};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub file_path: String,
    pub action: ReviewAction,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feedback: Option<String>,
    pub had_edited_content: bool,
}

impl DecisionLogEntry {
    pub fn new(update: &DocUpdate, decision: &ReviewDecision) -> Self {
        Self {
            timestamp: Utc::now(),
            file_path: update.file_path.clone(),
            action: decision.action,
            reasoning: update.reasoning.clone(),
            feedback: decision.feedback.clone(),
            had_edited_content: decision.edited_content.is_some(),
        }
    }
}

/// Append-only JSON array of review decisions.
///
/// Best effort: a failed append is logged at debug level and otherwise ignored.
#[derive(Debug, Clone)]
pub struct DecisionLog {
    path: PathBuf,
}

impl DecisionLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, update: &DocUpdate, decision: &ReviewDecision) {
        let entry = DecisionLogEntry::new(update, decision);
        if let Err(e) = self.try_append(entry).await {
            debug!(
                "Could not record decision in {}: {}",
                self.path.display(),
                e
            );
        }
    }

    async fn try_append(&self, entry: DecisionLogEntry) -> crate::types::Result<()> {
        let mut entries = self.read().await?;
        entries.push(entry);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Every recorded entry; a missing file is an empty log
    pub async fn read(&self) -> crate::types::Result<Vec<DecisionLogEntry>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn update(path: &str) -> DocUpdate {
        DocUpdate {
            file_path: path.to_string(),
            original_content: "old".to_string(),
            updated_content: "new".to_string(),
            reasoning: "signature changed".to_string(),
        }
    }

    #[tokio::test]
    async fn test_appends_camel_case_entries() {
        let dir = TempDir::new().unwrap();
        let log = DecisionLog::new(dir.path().join(".docsync/decisions.json"));

        log.append(&update("a.md"), &ReviewDecision::approve()).await;
        log.append(&update("b.md"), &ReviewDecision::edit("mine")).await;
        log.append(&update("c.md"), &ReviewDecision::reject(Some("wrong".into())))
            .await;

        let raw = std::fs::read_to_string(log.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["filePath"], "a.md");
        assert_eq!(entries[0]["action"], "approve");
        assert_eq!(entries[0]["hadEditedContent"], false);
        assert!(entries[0].get("feedback").is_none());
        assert_eq!(entries[1]["hadEditedContent"], true);
        assert_eq!(entries[2]["feedback"], "wrong");
        assert!(entries[2]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let dir = TempDir::new().unwrap();
        // the log path is a directory, so the write fails
        let log = DecisionLog::new(dir.path());
        log.append(&update("a.md"), &ReviewDecision::approve()).await;

        let corrupt = dir.path().join("decisions.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        let log = DecisionLog::new(&corrupt);
        log.append(&update("a.md"), &ReviewDecision::approve()).await;
        assert_eq!(std::fs::read_to_string(&corrupt).unwrap(), "{not json");
    }
}
