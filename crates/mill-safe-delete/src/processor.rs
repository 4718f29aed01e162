//! Safe delete entry point: runs the phases in order for one root target

use crate::apply::apply;
use crate::classify::classify;
use crate::closure::{build_closure_with, Traversal};
use crate::context::PhaseContext;
use crate::lock::ProjectLock;
use crate::registry::TargetSupportRegistry;
use crate::reporting::{LogConflictReporter, TracingProgress};
use crate::safety::filter_declarations;
use crate::usages::UsageCollector;
use chrono::Utc;
use mill_config::logging::session_span;
use mill_config::SafeDeleteConfig;
use mill_foundation::protocol::{
    CodeModel, ConflictReporter, DocumentStore, Phase, ProgressReporter, SearchService,
};
use mill_foundation::{ApplyReport, MillError, MillResult, SafeDeletePlan, TargetPointer};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};
use uuid::Uuid;

/// Result of a safe delete that did not fail
#[derive(Debug)]
pub enum SafeDeleteOutcome {
    /// No conflicts; every edit was committed in one transaction
    Applied(ApplyReport),
    /// Dry run; nothing was applied
    Preview(SafeDeletePlan),
    /// Conflicts were shown to the user and nothing was applied
    ConflictsReported(Vec<String>),
    /// Cancelled before anything was applied
    Cancelled,
}

impl SafeDeleteOutcome {
    pub fn applied(&self) -> Option<&ApplyReport> {
        match self {
            SafeDeleteOutcome::Applied(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SafeDeleteOutcome::Cancelled)
    }
}

/// External collaborators the processor drives
#[derive(Clone)]
pub struct SafeDeleteServices {
    pub model: Arc<dyn CodeModel>,
    pub registry: Arc<TargetSupportRegistry>,
    pub search: Arc<dyn SearchService>,
    pub documents: Arc<dyn DocumentStore>,
    pub conflicts: Arc<dyn ConflictReporter>,
    pub progress: Arc<dyn ProgressReporter>,
    pub lock: ProjectLock,
}

impl SafeDeleteServices {
    /// Services with logging conflict/progress reporters and a private lock
    pub fn new(
        model: Arc<dyn CodeModel>,
        registry: Arc<TargetSupportRegistry>,
        search: Arc<dyn SearchService>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            model,
            registry,
            search,
            documents,
            conflicts: Arc::new(LogConflictReporter),
            progress: Arc::new(TracingProgress),
            lock: ProjectLock::new(),
        }
    }

    pub fn with_conflict_reporter(mut self, conflicts: Arc<dyn ConflictReporter>) -> Self {
        self.conflicts = conflicts;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Share the host's project lock instead of a private one
    pub fn with_lock(mut self, lock: ProjectLock) -> Self {
        self.lock = lock;
        self
    }
}

/// Deletes a target together with everything that must go with it
///
/// # Example
///
/// ```rust,ignore
/// let processor = Arc::new(SafeDeleteProcessor::new(services, config));
/// let handle = processor.spawn(root);
/// match handle.wait().await? {
///     SafeDeleteOutcome::Applied(report) => println!("{} files", report.modified_files.len()),
///     other => println!("{:?}", other),
/// }
/// ```
pub struct SafeDeleteProcessor {
    services: SafeDeleteServices,
    config: SafeDeleteConfig,
    traversal: Traversal,
}

impl SafeDeleteProcessor {
    pub fn new(services: SafeDeleteServices, config: SafeDeleteConfig) -> Self {
        Self {
            services,
            config,
            traversal: Traversal::default(),
        }
    }

    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn config(&self) -> &SafeDeleteConfig {
        &self.config
    }

    /// Run a safe delete of `root`.
    ///
    /// Cancellation observed before the apply step yields
    /// `SafeDeleteOutcome::Cancelled` and leaves the project untouched.
    pub async fn run(
        &self,
        root: TargetPointer,
        cancel: CancellationToken,
    ) -> MillResult<SafeDeleteOutcome> {
        let session_id = Uuid::new_v4().to_string();
        let span = session_span(&session_id, &root.to_string());

        async move {
            match self.execute(root, cancel).await {
                Err(MillError::Cancelled) => {
                    info!("Safe delete cancelled, nothing applied");
                    Ok(SafeDeleteOutcome::Cancelled)
                }
                Err(err @ MillError::Conflicts { .. }) => Err(err),
                Err(err) => {
                    error!(error = %err, category = err.category(), "Safe delete failed");
                    Err(err)
                }
                ok => ok,
            }
        }
        .instrument(span)
        .await
    }

    /// Run on the tokio worker pool, returning a handle to cancel or await it
    pub fn spawn(self: &Arc<Self>, root: TargetPointer) -> SafeDeleteHandle {
        let cancel = CancellationToken::new();
        let processor = Arc::clone(self);
        let token = cancel.clone();
        let task = tokio::spawn(async move { processor.run(root, token).await });

        SafeDeleteHandle { cancel, task }
    }

    async fn execute(
        &self,
        root: TargetPointer,
        cancel: CancellationToken,
    ) -> MillResult<SafeDeleteOutcome> {
        let ctx = PhaseContext {
            model: self.services.model.clone(),
            registry: self.services.registry.clone(),
            lock: self.services.lock.clone(),
            progress: self.services.progress.clone(),
            cancel,
        };

        let root_target = {
            let _scope = ctx.lock.read().await;
            ctx.model.resolve(&root)
        }
        .ok_or_else(|| MillError::not_found(root.to_string()))?;
        let root_name = root_target.presentation().to_string();
        info!(name = %root_name, kind = root_target.kind(), "Starting safe delete");

        let closure = build_closure_with(&ctx, root, self.traversal).await?;
        let surviving = filter_declarations(&ctx, closure, root).await?;

        let usages = UsageCollector::new(self.services.search.clone(), &self.config.search)
            .collect(&ctx, &surviving.targets, &surviving.declarations)
            .await?;

        ctx.check_cancelled()?;
        ctx.progress.begin(Phase::Classify);
        let classification = {
            let _scope = ctx.lock.read().await;
            classify(&root_name, &usages, &surviving.declarations)?
        };
        ctx.progress.finish(Phase::Classify);

        if self.config.execution.dry_run {
            let plan = SafeDeletePlan {
                root: root_name,
                targets: surviving
                    .targets
                    .iter()
                    .map(|t| t.presentation().to_string())
                    .collect(),
                declaration_count: surviving.declarations.len(),
                usage_count: usages.len(),
                operations: classification.operations,
                conflicts: classification.conflicts,
                created_at: Utc::now(),
            };
            info!(
                operation_count = plan.operations.len(),
                conflict_count = plan.conflicts.len(),
                "Dry run, returning plan"
            );
            return Ok(SafeDeleteOutcome::Preview(plan));
        }

        apply(
            &ctx,
            &self.config.execution,
            self.services.documents.as_ref(),
            self.services.conflicts.as_ref(),
            &root_name,
            classification,
        )
        .await
    }
}

/// Handle to a safe delete running in the background
pub struct SafeDeleteHandle {
    cancel: CancellationToken,
    task: JoinHandle<MillResult<SafeDeleteOutcome>>,
}

impl SafeDeleteHandle {
    /// Request cancellation of every phase, including the usage search tasks
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the outcome
    pub async fn wait(self) -> MillResult<SafeDeleteOutcome> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Ok(SafeDeleteOutcome::Cancelled),
            Err(err) => Err(MillError::internal(format!("Safe delete task failed: {}", err))),
        }
    }
}
