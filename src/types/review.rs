use serde::{Deserialize, Serialize};
use std::fmt;

/// A generated replacement for one documentation file, awaiting review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocUpdate {
    pub file_path: String,
    pub original_content: String,
    pub updated_content: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    Edit,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub action: ReviewAction,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub edited_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feedback: Option<String>,
}

impl ReviewDecision {
    pub fn approve() -> Self {
        Self {
            action: ReviewAction::Approve,
            edited_content: None,
            feedback: None,
        }
    }

    pub fn reject(feedback: Option<String>) -> Self {
        Self {
            action: ReviewAction::Reject,
            edited_content: None,
            feedback,
        }
    }

    pub fn edit(content: impl Into<String>) -> Self {
        Self {
            action: ReviewAction::Edit,
            edited_content: Some(content.into()),
            feedback: None,
        }
    }

    /// Text to write for this update, `None` when rejected.
    ///
    /// An edit without content falls back to the generated text.
    pub fn content_for<'a>(&'a self, update: &'a DocUpdate) -> Option<&'a str> {
        match self.action {
            ReviewAction::Approve => Some(&update.updated_content),
            ReviewAction::Edit => Some(
                self.edited_content
                    .as_deref()
                    .unwrap_or(&update.updated_content),
            ),
            ReviewAction::Reject => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> DocUpdate {
        DocUpdate {
            file_path: "docs/api.md".to_string(),
            original_content: "old".to_string(),
            updated_content: "new".to_string(),
            reasoning: "why".to_string(),
        }
    }

    #[test]
    fn test_content_for() {
        let u = update();
        assert_eq!(ReviewDecision::approve().content_for(&u), Some("new"));
        assert_eq!(ReviewDecision::edit("mine").content_for(&u), Some("mine"));
        assert_eq!(ReviewDecision::reject(None).content_for(&u), None);

        let bare_edit = ReviewDecision {
            action: ReviewAction::Edit,
            edited_content: None,
            feedback: None,
        };
        assert_eq!(bare_edit.content_for(&u), Some("new"));
    }

    #[test]
    fn test_action_serde() {
        let json = serde_json::to_value(ReviewDecision::reject(Some("no".into()))).unwrap();
        assert_eq!(json["action"], "reject");
        assert_eq!(json["feedback"], "no");
        assert!(json.get("edited_content").is_none());
    }
}
