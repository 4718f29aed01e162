//! File operations and the plans and reports built from them.

pub mod edit;
pub mod result;

pub use edit::*;
pub use result::*;
