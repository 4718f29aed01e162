//! Default progress and conflict reporting through `tracing`

use mill_foundation::protocol::{ConflictReporter, Phase, ProgressReporter};
use tracing::{debug, info, warn};

/// Progress reporter that logs phase boundaries
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn begin(&self, phase: Phase) {
        info!(phase = ?phase, "{}", phase.title());
    }

    fn advance(&self, phase: Phase, processed: usize) {
        debug!(phase = ?phase, processed, "Progress");
    }

    fn finish(&self, phase: Phase) {
        debug!(phase = ?phase, "Phase finished");
    }
}

/// Conflict "dialog" for hosts without a UI: logs each message
#[derive(Debug, Default, Clone, Copy)]
pub struct LogConflictReporter;

impl ConflictReporter for LogConflictReporter {
    fn show_conflicts(&self, root: &str, messages: &[String]) {
        for message in messages {
            warn!(root, conflict = %message, "Safe delete conflict");
        }
    }
}
