//! Safe delete engine
//!
//! Given a root target, computes every target that must be deleted with it,
//! finds every usage of those targets across the project, classifies each
//! item as removable or conflicting and, only when nothing conflicts, applies
//! all edits as one transaction.
//!
//! Phases run strictly in order: closure, declaration check, usage search,
//! classification, apply. The usage search itself runs a producer and a
//! consumer task joined through a bounded queue.

pub mod apply;
pub mod classify;
pub mod closure;
pub mod context;
pub mod documents;
pub mod lock;
pub mod processor;
pub mod registry;
pub mod reporting;
pub mod safety;
pub mod usages;

pub use classify::{classify, Classification};
pub use closure::{build_closure, build_closure_with, Closure, Traversal};
pub use context::PhaseContext;
pub use documents::FileSystemDocuments;
pub use lock::ProjectLock;
pub use processor::{SafeDeleteHandle, SafeDeleteOutcome, SafeDeleteProcessor, SafeDeleteServices};
pub use registry::TargetSupportRegistry;
pub use reporting::{LogConflictReporter, TracingProgress};
pub use safety::{filter_declarations, SurvivingTargets};
pub use usages::UsageCollector;
