//! Document store and conflict dialog contracts.

use crate::error::MillResult;
use crate::planning::{ApplyReport, FileOperation};
use async_trait::async_trait;

/// One undoable unit of edits
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Label shown in undo history
    pub label: String,
    pub operations: Vec<FileOperation>,
}

impl Transaction {
    pub fn new(label: impl Into<String>, operations: Vec<FileOperation>) -> Self {
        Self {
            label: label.into(),
            operations,
        }
    }
}

/// Mutable document model of the project
///
/// Implementations own all-or-nothing semantics: if any operation in a
/// transaction fails, none of them may remain applied.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn commit(&self, transaction: Transaction) -> MillResult<ApplyReport>;
}

/// Displays conflict messages to the user
pub trait ConflictReporter: Send + Sync {
    /// Show `messages` and return after acknowledgment
    fn show_conflicts(&self, root: &str, messages: &[String]);
}
