//! API Diff Engine
//!
//! Compares two API-element collections and partitions every name into
//! added / removed / modified / unchanged, then classifies the compatibility
//! impact of the whole diff.
//!
//! Severity decision list (first match wins):
//!
//! | Severity   | Condition                                                        |
//! |------------|------------------------------------------------------------------|
//! | `breaking` | public element removed, or public element's params/return changed |
//! | `major`    | public element added                                             |
//! | `minor`    | public element changed in anything but documentation             |
//! | `patch`    | everything else, including the empty diff                        |

use std::collections::HashMap;

use tracing::debug;

use crate::types::{
    ApiDiff, ApiElement, ChangeDetail, ChangeKind, ChangeSeverity, ModifiedApi, Parameter,
};

pub struct DiffEngine;

impl DiffEngine {
    /// Partition `old ∪ new` by element name.
    ///
    /// Duplicate names inside one collection resolve to the last occurrence.
    /// Each bucket is sorted by name so the result does not depend on input order.
    pub fn analyze(old: &[ApiElement], new: &[ApiElement]) -> ApiDiff {
        let old_map: HashMap<&str, &ApiElement> =
            old.iter().map(|e| (e.name.as_str(), e)).collect();
        let new_map: HashMap<&str, &ApiElement> =
            new.iter().map(|e| (e.name.as_str(), e)).collect();

        let mut diff = ApiDiff::default();

        for (name, new_el) in &new_map {
            match old_map.get(name) {
                None => diff.added.push((*new_el).clone()),
                Some(old_el) => {
                    let changes = Self::compare_elements(old_el, new_el);
                    if changes.is_empty() {
                        diff.unchanged.push((*new_el).clone());
                    } else {
                        diff.modified.push(ModifiedApi {
                            old: (*old_el).clone(),
                            new: (*new_el).clone(),
                            changes,
                        });
                    }
                }
            }
        }

        for (name, old_el) in &old_map {
            if !new_map.contains_key(name) {
                diff.removed.push((*old_el).clone());
            }
        }

        diff.added.sort_by(|a, b| a.name.cmp(&b.name));
        diff.removed.sort_by(|a, b| a.name.cmp(&b.name));
        diff.unchanged.sort_by(|a, b| a.name.cmp(&b.name));
        diff.modified.sort_by(|a, b| a.new.name.cmp(&b.new.name));

        debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            modified = diff.modified.len(),
            unchanged = diff.unchanged.len(),
            "API diff computed"
        );

        diff
    }

    /// Field-level differences between two versions of the same element.
    ///
    /// At most one detail per kind, always in the order
    /// signature, parameters, return type, documentation.
    pub fn compare_elements(old: &ApiElement, new: &ApiElement) -> Vec<ChangeDetail> {
        let mut changes = Vec::new();

        if old.signature != new.signature {
            changes.push(ChangeDetail::new(
                ChangeKind::Signature,
                format!(
                    "Signature changed from `{}` to `{}`",
                    old.signature, new.signature
                ),
            ));
        }

        if let Some(description) = Self::compare_parameters(old.params(), new.params()) {
            changes.push(ChangeDetail::new(ChangeKind::Parameters, description));
        }

        if old.return_type != new.return_type {
            changes.push(ChangeDetail::new(
                ChangeKind::ReturnType,
                format!(
                    "Return type changed from {} to {}",
                    old.return_type.as_deref().unwrap_or("void"),
                    new.return_type.as_deref().unwrap_or("void")
                ),
            ));
        }

        if old.documentation != new.documentation {
            let description = match (&old.documentation, &new.documentation) {
                (None, Some(_)) => "Documentation added",
                (Some(_), None) => "Documentation removed",
                _ => "Documentation changed",
            };
            changes.push(ChangeDetail::new(ChangeKind::Documentation, description));
        }

        changes
    }

    /// First parameter difference, if any
    fn compare_parameters(old: &[Parameter], new: &[Parameter]) -> Option<String> {
        if old.len() != new.len() {
            return Some(format!(
                "Parameter count changed from {} to {}",
                old.len(),
                new.len()
            ));
        }

        old.iter()
            .zip(new)
            .enumerate()
            .find(|(_, (a, b))| a != b)
            .map(|(i, (a, b))| format!("Parameter {} changed from `{}` to `{}`", i + 1, a, b))
    }

    /// Whether the diff touches anything callers can see
    pub fn is_public_api_change(diff: &ApiDiff) -> bool {
        diff.added.iter().any(|e| e.is_public)
            || diff.removed.iter().any(|e| e.is_public)
            || diff
                .modified
                .iter()
                .any(|m| m.old.is_public || m.new.is_public)
    }

    pub fn calculate_severity(diff: &ApiDiff) -> ChangeSeverity {
        let public_modified = || diff.modified.iter().filter(|m| m.old.is_public);

        if diff.removed.iter().any(|e| e.is_public)
            || public_modified().any(|m| {
                m.has_change(ChangeKind::Parameters) || m.has_change(ChangeKind::ReturnType)
            })
        {
            return ChangeSeverity::Breaking;
        }

        if diff.added.iter().any(|e| e.is_public) {
            return ChangeSeverity::Major;
        }

        if public_modified().any(|m| m.has_code_change()) {
            return ChangeSeverity::Minor;
        }

        ChangeSeverity::Patch
    }
}
