//! Contains all plan result types.

use crate::planning::edit::FileOperation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Outcome of committing a transaction
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Files whose contents were rewritten
    pub modified_files: Vec<PathBuf>,
    /// Files that were removed
    pub deleted_files: Vec<PathBuf>,
    /// Number of operations applied
    pub operation_count: usize,
}

/// Preview of a safe delete that was computed but not applied
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeDeletePlan {
    /// Display name of the root target
    pub root: String,
    /// Display names of every surviving target, in closure order
    pub targets: Vec<String>,
    pub declaration_count: usize,
    pub usage_count: usize,
    /// Operations that would be committed
    pub operations: Vec<FileOperation>,
    /// Conflict messages that would block the deletion
    pub conflicts: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl SafeDeletePlan {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Every file touched by the plan, sorted and without duplicates
    pub fn affected_files(&self) -> Vec<PathBuf> {
        self.operations
            .iter()
            .map(|op| op.file_path.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
