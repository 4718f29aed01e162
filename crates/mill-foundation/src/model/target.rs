//! Deletable entities and the re-resolvable pointers that name them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, re-resolvable handle to a deletable entity.
///
/// A pointer is only a key: dereferencing it goes through
/// [`CodeModel::resolve`](crate::protocol::CodeModel::resolve), which returns
/// `None` once the entity no longer exists. Two targets are the same target
/// iff their pointers compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetPointer(u64);

impl TargetPointer {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// A live entity selected for deletion, as returned by the code model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pointer: TargetPointer,
    /// Entity kind, used to select the capability that handles it
    kind: String,
    /// Display name shown in conflict messages
    name: String,
}

impl Target {
    pub fn new(pointer: TargetPointer, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pointer,
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn pointer(&self) -> TargetPointer {
        self.pointer
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable name of the entity
    pub fn presentation(&self) -> &str {
        &self.name
    }
}
