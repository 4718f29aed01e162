//! Registry of target-kind capabilities

use mill_foundation::protocol::TargetSupport;
use mill_foundation::{MillError, MillResult, Target};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps an entity kind to the capability that knows how to delete it
///
/// Language plugins register one [`TargetSupport`] per kind they handle; the
/// engine never inspects targets beyond asking this table.
pub struct TargetSupportRegistry {
    supports: HashMap<&'static str, Arc<dyn TargetSupport>>,
}

impl TargetSupportRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            supports: HashMap::new(),
        }
    }

    /// Register a capability; a later registration for the same kind wins
    pub fn register(&mut self, support: Arc<dyn TargetSupport>) {
        if self.supports.insert(support.kind(), support.clone()).is_some() {
            tracing::warn!(kind = support.kind(), "Replacing existing target support");
        }
    }

    pub fn with(mut self, support: Arc<dyn TargetSupport>) -> Self {
        self.register(support);
        self
    }

    pub fn find(&self, kind: &str) -> Option<&dyn TargetSupport> {
        self.supports.get(kind).map(|arc| arc.as_ref())
    }

    /// Capability for `target`, or `NotSupported` if its kind is unknown
    pub fn support_for(&self, target: &Target) -> MillResult<&dyn TargetSupport> {
        self.find(target.kind()).ok_or_else(|| {
            MillError::not_supported(format!(
                "safe delete of '{}' (kind '{}')",
                target.presentation(),
                target.kind()
            ))
        })
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.supports.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for TargetSupportRegistry {
    fn default() -> Self {
        Self::new()
    }
}
