use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ApiElement;

/// Which field of an element differs between two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Signature,
    Parameters,
    ReturnType,
    Documentation,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Parameters => "parameters",
            Self::ReturnType => "return_type",
            Self::Documentation => "documentation",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetail {
    pub kind: ChangeKind,
    pub description: String,
}

impl ChangeDetail {
    pub fn new(kind: ChangeKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

/// An element present in both versions with at least one difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedApi {
    pub old: ApiElement,
    pub new: ApiElement,
    pub changes: Vec<ChangeDetail>,
}

impl ModifiedApi {
    pub fn has_change(&self, kind: ChangeKind) -> bool {
        self.changes.iter().any(|c| c.kind == kind)
    }

    /// True when something other than documentation changed
    pub fn has_code_change(&self) -> bool {
        self.changes
            .iter()
            .any(|c| c.kind != ChangeKind::Documentation)
    }
}

/// Partition of every element name in `old ∪ new` into four buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDiff {
    pub added: Vec<ApiElement>,
    pub removed: Vec<ApiElement>,
    pub modified: Vec<ModifiedApi>,
    pub unchanged: Vec<ApiElement>,
}

impl ApiDiff {
    /// Synthetic diff for a newly created source file
    pub fn all_added(apis: Vec<ApiElement>) -> Self {
        Self {
            added: apis,
            ..Default::default()
        }
    }

    /// Synthetic diff for a deleted source file
    pub fn all_removed(apis: Vec<ApiElement>) -> Self {
        Self {
            removed: apis,
            ..Default::default()
        }
    }

    /// Concatenate another diff's buckets onto this one. Duplicates are kept.
    pub fn merge(&mut self, other: ApiDiff) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.modified.extend(other.modified);
        self.unchanged.extend(other.unchanged);
    }

    /// Number of changed elements (added + removed + modified)
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    /// Elements worth looking up in documentation, in bucket order
    pub fn changed_elements(&self) -> impl Iterator<Item = &ApiElement> {
        self.added
            .iter()
            .chain(self.removed.iter())
            .chain(self.modified.iter().map(|m| &m.new))
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Compatibility impact of an API change, ordered `Patch < Minor < Major < Breaking`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSeverity {
    #[default]
    Patch,
    Minor,
    Major,
    Breaking,
}

impl ChangeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Breaking => "breaking",
        }
    }
}

impl fmt::Display for ChangeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            "breaking" => Ok(Self::Breaking),
            other => Err(format!(
                "Unknown severity '{}' (expected patch, minor, major or breaking)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ChangeSeverity::Patch < ChangeSeverity::Minor);
        assert!(ChangeSeverity::Minor < ChangeSeverity::Major);
        assert!(ChangeSeverity::Major < ChangeSeverity::Breaking);
        assert_eq!(ChangeSeverity::default(), ChangeSeverity::Patch);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("MAJOR".parse::<ChangeSeverity>(), Ok(ChangeSeverity::Major));
        assert!("huge".parse::<ChangeSeverity>().is_err());
    }

    #[test]
    fn test_merge_keeps_duplicates() {
        let mut a = ApiDiff::all_added(vec![ApiElement::function("foo")]);
        let b = ApiDiff::all_added(vec![ApiElement::function("foo")]);
        a.merge(b);
        assert_eq!(a.added.len(), 2);
        assert_eq!(a.change_count(), 2);
    }

    #[test]
    fn test_changed_elements_uses_new_side() {
        let old = ApiElement::function("foo").with_signature("foo()");
        let new = ApiElement::function("foo").with_signature("foo(x)");
        let diff = ApiDiff {
            removed: vec![ApiElement::function("bar")],
            modified: vec![ModifiedApi {
                old,
                new: new.clone(),
                changes: vec![ChangeDetail::new(ChangeKind::Signature, "changed")],
            }],
            ..Default::default()
        };

        let names: Vec<_> = diff.changed_elements().map(|e| e.signature.as_str()).collect();
        assert_eq!(names, vec!["bar", "foo(x)"]);
    }
}
