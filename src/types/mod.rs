pub mod api;
pub mod change;
pub mod diff;
pub mod docs;
pub mod error;
pub mod review;

pub use api::{ApiElement, ApiKind, Parameter, SourceLocation};
pub use change::{ChangeType, CodeChange};
pub use diff::{ApiDiff, ChangeDetail, ChangeKind, ChangeSeverity, ModifiedApi};
pub use docs::{AffectedDocumentation, CodeExample, DocFile, DocReference, ReferenceType};
pub use error::{DocSyncError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use review::{DocUpdate, ReviewAction, ReviewDecision};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for pipeline session IDs
///
/// Every agent run gets a fresh UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random session identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod newtype_tests {
    use super::*;

    #[test]
    fn test_session_id() {
        let id = SessionId::new("sess-123");
        assert_eq!(id.as_str(), "sess-123");
        assert_eq!(format!("{}", id), "sess-123");
    }

    #[test]
    fn test_generated_session_ids_differ() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }
}
