//! Recording collaborators for asserting on what the engine did

use async_trait::async_trait;
use mill_foundation::protocol::{
    ConflictReporter, DocumentStore, Phase, ProgressReporter, Transaction,
};
use mill_foundation::{ApplyReport, MillError, MillResult};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Document store that records transactions instead of editing files
#[derive(Default)]
pub struct RecordingDocuments {
    transactions: Mutex<Vec<Transaction>>,
    fail: AtomicBool,
}

impl RecordingDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later commit fail without recording anything
    pub fn fail_commits(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().unwrap().clone()
    }

    /// Operations across every committed transaction
    pub fn applied_operation_count(&self) -> usize {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .map(|transaction| transaction.operations.len())
            .sum()
    }
}

#[async_trait]
impl DocumentStore for RecordingDocuments {
    async fn commit(&self, transaction: Transaction) -> MillResult<ApplyReport> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MillError::transaction("commit rejected"));
        }

        let modified_files: BTreeSet<_> = transaction
            .operations
            .iter()
            .map(|op| op.file_path.clone())
            .collect();
        let report = ApplyReport {
            modified_files: modified_files.into_iter().collect(),
            deleted_files: Vec::new(),
            operation_count: transaction.operations.len(),
        };

        self.transactions.lock().unwrap().push(transaction);
        Ok(report)
    }
}

/// Conflict dialog that remembers what it was shown
#[derive(Default)]
pub struct RecordingConflicts {
    shown: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingConflicts {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(root, messages)` for every time the dialog was opened
    pub fn shown(&self) -> Vec<(String, Vec<String>)> {
        self.shown.lock().unwrap().clone()
    }
}

impl ConflictReporter for RecordingConflicts {
    fn show_conflicts(&self, root: &str, messages: &[String]) {
        self.shown
            .lock()
            .unwrap()
            .push((root.to_string(), messages.to_vec()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Begin(Phase),
    Advance(Phase, usize),
    Finish(Phase),
}

/// Progress reporter that keeps every event
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Phases in the order they began
    pub fn phases_begun(&self) -> Vec<Phase> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Begin(phase) => Some(phase),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn begin(&self, phase: Phase) {
        self.events.lock().unwrap().push(ProgressEvent::Begin(phase));
    }

    fn advance(&self, phase: Phase, processed: usize) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Advance(phase, processed));
    }

    fn finish(&self, phase: Phase) {
        self.events.lock().unwrap().push(ProgressEvent::Finish(phase));
    }
}
