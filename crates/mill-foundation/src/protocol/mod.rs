//! Collaborator contracts consumed by the safe delete engine
//!
//! The engine is agnostic to how each of these is implemented. Language
//! plugins provide [`TargetSupport`] per entity kind, the indexing layer
//! provides [`SearchService`], and the host provides the code model, the
//! document store, the conflict dialog and progress reporting.

pub mod documents;
pub mod progress;
pub mod search;

pub use documents::*;
pub use progress::*;
pub use search::*;

use crate::error::MillResult;
use crate::model::{Declaration, Target, TargetPointer};

/// Dereferences target pointers against the live project
pub trait CodeModel: Send + Sync {
    /// Current live instance, or `None` if the entity no longer exists
    fn resolve(&self, pointer: &TargetPointer) -> Option<Target>;
}

/// Per-kind capability describing how a target participates in safe delete
///
/// # Example
///
/// ```rust,ignore
/// let support = registry.find(target.kind())?;
/// for pointer in support.additional_targets(&target, model)? {
///     // pointer must be deleted together with target
/// }
/// ```
pub trait TargetSupport: Send + Sync {
    /// Entity kind this capability handles
    fn kind(&self) -> &'static str;

    /// Targets that must be deleted together with `target`
    fn additional_targets(
        &self,
        target: &Target,
        model: &dyn CodeModel,
    ) -> MillResult<Vec<TargetPointer>>;

    /// The target's own definitions
    fn declarations(&self, target: &Target) -> MillResult<Vec<Declaration>>;

    /// Query that finds every reference to `target`
    fn search_query(&self, target: &Target, options: &SearchOptions) -> MillResult<SearchQuery>;
}
