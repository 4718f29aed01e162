//! State shared by every phase of one safe delete invocation

use crate::lock::ProjectLock;
use crate::registry::TargetSupportRegistry;
use mill_foundation::protocol::{CodeModel, ProgressReporter};
use mill_foundation::{MillError, MillResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Collaborators and cancellation scope threaded through the phases
#[derive(Clone)]
pub struct PhaseContext {
    pub model: Arc<dyn CodeModel>,
    pub registry: Arc<TargetSupportRegistry>,
    pub lock: ProjectLock,
    pub progress: Arc<dyn ProgressReporter>,
    pub cancel: CancellationToken,
}

impl PhaseContext {
    /// Fail with `Cancelled` once the invocation has been cancelled
    pub fn check_cancelled(&self) -> MillResult<()> {
        if self.cancel.is_cancelled() {
            return Err(MillError::Cancelled);
        }
        Ok(())
    }
}
