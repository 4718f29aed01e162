//! Conflict classification and update aggregation

use mill_foundation::{
    Declaration, FileOperation, MillResult, SafeDeleteItem, Usage,
};
use tracing::debug;

/// Safe edits and blocking messages for one safe delete
#[derive(Debug, Default)]
pub struct Classification {
    /// Edits from every safe item, usages first
    pub operations: Vec<FileOperation>,
    /// Conflict messages, including the unlabeled summary if any
    pub conflicts: Vec<String>,
    /// Unsafe items that carried no message
    pub unlabeled_conflicts: usize,
}

impl Classification {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Partition usages and declarations into safe edits and conflicts.
///
/// Nothing is applied here; safe items are only asked to describe their edits.
pub fn classify(
    root: &str,
    usages: &[Usage],
    declarations: &[Declaration],
) -> MillResult<Classification> {
    let items = usages
        .iter()
        .map(|u| u as &dyn SafeDeleteItem)
        .chain(declarations.iter().map(|d| d as &dyn SafeDeleteItem));

    let mut classification = Classification::default();

    for item in items {
        if item.is_safe_to_delete() {
            classification.operations.extend(item.prepare_update()?);
            continue;
        }

        match item.conflict_message() {
            Some(message) if !message.is_empty() => {
                debug!(target = %item.target(), conflict = message, "Conflict found");
                classification.conflicts.push(message.to_string());
            }
            _ => classification.unlabeled_conflicts += 1,
        }
    }

    if classification.unlabeled_conflicts > 0 {
        classification.conflicts.push(unlabeled_summary(
            root,
            classification.unlabeled_conflicts,
        ));
    }

    Ok(classification)
}

fn unlabeled_summary(root: &str, count: usize) -> String {
    format!("{} has {} usages that are not safe to delete.", root, count)
}
