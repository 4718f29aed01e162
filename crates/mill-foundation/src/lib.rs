//! Foundation Layer - Core types, collaborator contracts and errors
//!
//! This crate provides the shared building blocks for safe delete:
//! - The data model (targets, declarations, usages, file operations)
//! - The collaborator traits the engine consumes (code model, search,
//!   document store, conflict dialog, progress)
//! - `MillError` and `MillResult`
//!
//! It contains no engine logic so that language plugins and test doubles can
//! depend on it without pulling in the engine.

pub mod error;
pub mod model;
pub mod planning;
pub mod protocol;

// Re-export commonly used types for convenience
pub use error::*;
pub use model::*;
pub use planning::*;
