//! Progress reporting contract.

use serde::Serialize;
use std::fmt;

/// Phases of a safe delete, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CollectTargets,
    CheckDeclarations,
    FindUsages,
    Classify,
    Apply,
}

impl Phase {
    pub fn title(&self) -> &'static str {
        match self {
            Phase::CollectTargets => "Collecting elements to delete",
            Phase::CheckDeclarations => "Checking declarations",
            Phase::FindUsages => "Looking for usages",
            Phase::Classify => "Preparing changes",
            Phase::Apply => "Deleting",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// User-visible progress indicator associated with each phase
pub trait ProgressReporter: Send + Sync {
    fn begin(&self, phase: Phase);

    /// `processed` items handled so far in `phase`
    fn advance(&self, phase: Phase, processed: usize);

    fn finish(&self, phase: Phase);
}
