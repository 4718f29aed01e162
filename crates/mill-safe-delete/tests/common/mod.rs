//! Shared test utilities

#![allow(dead_code)]

use mill_config::SafeDeleteConfig;
use mill_foundation::protocol::DocumentStore;
use mill_safe_delete::{
    PhaseContext, ProjectLock, SafeDeleteProcessor, SafeDeleteServices, TargetSupportRegistry,
};
use mill_test_support::{
    create_test_config, FixtureProject, RecordingConflicts, RecordingDocuments, RecordingProgress,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fixture project wired to recording collaborators
pub struct TestProject {
    pub fixture: Arc<FixtureProject>,
    pub documents: Arc<RecordingDocuments>,
    pub conflicts: Arc<RecordingConflicts>,
    pub progress: Arc<RecordingProgress>,
    pub lock: ProjectLock,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            fixture: Arc::new(FixtureProject::new()),
            documents: Arc::new(RecordingDocuments::new()),
            conflicts: Arc::new(RecordingConflicts::new()),
            progress: Arc::new(RecordingProgress::new()),
            lock: ProjectLock::new(),
        }
    }

    pub fn registry(&self) -> Arc<TargetSupportRegistry> {
        Arc::new(TargetSupportRegistry::new().with(self.fixture.clone()))
    }

    pub fn context(&self) -> PhaseContext {
        self.context_with(CancellationToken::new())
    }

    pub fn context_with(&self, cancel: CancellationToken) -> PhaseContext {
        PhaseContext {
            model: self.fixture.clone(),
            registry: self.registry(),
            lock: self.lock.clone(),
            progress: self.progress.clone(),
            cancel,
        }
    }

    pub fn services(&self) -> SafeDeleteServices {
        self.services_with_documents(self.documents.clone())
    }

    pub fn services_with_documents(&self, documents: Arc<dyn DocumentStore>) -> SafeDeleteServices {
        SafeDeleteServices::new(
            self.fixture.clone(),
            self.registry(),
            self.fixture.clone(),
            documents,
        )
        .with_conflict_reporter(self.conflicts.clone())
        .with_progress(self.progress.clone())
        .with_lock(self.lock.clone())
    }

    /// Headless processor over the recording document store
    pub fn processor(&self) -> SafeDeleteProcessor {
        self.processor_with(create_test_config())
    }

    pub fn processor_with(&self, config: SafeDeleteConfig) -> SafeDeleteProcessor {
        SafeDeleteProcessor::new(self.services(), config)
    }
}
