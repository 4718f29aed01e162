//! Data model shared by the engine and its collaborators.

pub mod item;
pub mod location;
pub mod target;

pub use item::*;
pub use location::*;
pub use target::*;
