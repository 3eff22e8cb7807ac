use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analyzer::parser::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// One changed source file as reported by a change detector.
///
/// For deletions `content` is empty and `previous_content` holds the last
/// committed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChange {
    pub file_path: String,
    pub change_type: ChangeType,
    pub language: Language,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub previous_content: Option<String>,
}

impl CodeChange {
    pub fn added(path: impl Into<String>, content: impl Into<String>) -> Self {
        let file_path = path.into();
        Self {
            language: Language::from_path(&file_path),
            file_path,
            change_type: ChangeType::Added,
            content: content.into(),
            previous_content: None,
        }
    }

    pub fn modified(
        path: impl Into<String>,
        previous: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let file_path = path.into();
        Self {
            language: Language::from_path(&file_path),
            file_path,
            change_type: ChangeType::Modified,
            content: content.into(),
            previous_content: Some(previous.into()),
        }
    }

    pub fn deleted(path: impl Into<String>, previous: impl Into<String>) -> Self {
        let file_path = path.into();
        Self {
            language: Language::from_path(&file_path),
            file_path,
            change_type: ChangeType::Deleted,
            content: String::new(),
            previous_content: Some(previous.into()),
        }
    }
}
