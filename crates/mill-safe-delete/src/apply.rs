//! Transactional applier: report conflicts or commit every edit at once

use crate::classify::Classification;
use crate::context::PhaseContext;
use crate::processor::SafeDeleteOutcome;
use mill_config::{ExecutionConfig, ExecutionMode};
use mill_foundation::protocol::{ConflictReporter, DocumentStore, Phase, Transaction};
use mill_foundation::{ApplyReport, MillError, MillResult};
use tracing::{info, warn};

/// Apply `classification` or surface its conflicts.
///
/// With conflicts present nothing is written: headless execution fails with
/// `MillError::Conflicts` (unless `ignore_conflicts` is set) and interactive
/// execution shows the dialog and stops whatever the user does there.
pub async fn apply(
    ctx: &PhaseContext,
    execution: &ExecutionConfig,
    documents: &dyn DocumentStore,
    conflicts: &dyn ConflictReporter,
    root: &str,
    classification: Classification,
) -> MillResult<SafeDeleteOutcome> {
    if classification.has_conflicts() {
        match execution.mode {
            ExecutionMode::Headless if execution.ignore_conflicts => {
                warn!(
                    conflict_count = classification.conflicts.len(),
                    "Ignoring conflicts, applying safe edits"
                );
            }
            ExecutionMode::Headless => {
                info!(
                    conflict_count = classification.conflicts.len(),
                    "Safe delete blocked by conflicts"
                );
                return Err(MillError::conflicts(classification.conflicts));
            }
            ExecutionMode::Interactive => {
                ctx.check_cancelled()?;
                conflicts.show_conflicts(root, &classification.conflicts);
                info!(
                    conflict_count = classification.conflicts.len(),
                    "Conflicts shown, nothing deleted"
                );
                return Ok(SafeDeleteOutcome::ConflictsReported(classification.conflicts));
            }
        }
    }

    ctx.check_cancelled()?;
    ctx.progress.begin(Phase::Apply);

    if classification.operations.is_empty() {
        ctx.progress.finish(Phase::Apply);
        info!("Nothing to apply");
        return Ok(SafeDeleteOutcome::Applied(ApplyReport::default()));
    }

    let operation_count = classification.operations.len();
    let report = {
        // The write scope spans the commit; the store runs the edits as one unit
        let _scope = ctx.lock.write().await;
        ctx.check_cancelled()?;
        let transaction = Transaction::new(format!("Safe delete {}", root), classification.operations);
        documents.commit(transaction).await?
    };

    ctx.progress.advance(Phase::Apply, operation_count);
    ctx.progress.finish(Phase::Apply);
    info!(
        operation_count,
        modified_files = report.modified_files.len(),
        deleted_files = report.deleted_files.len(),
        "Safe delete applied"
    );
    Ok(SafeDeleteOutcome::Applied(report))
}
