//! Test support utilities and fixtures for TypeMill safe delete tests

pub mod fixture;
pub mod helpers;
pub mod mocks;
pub mod recording;

// Re-export commonly used helpers
pub use fixture::{FixtureProject, FIXTURE_KIND};
pub use helpers::{create_test_config, location};
pub use recording::{ProgressEvent, RecordingConflicts, RecordingDocuments, RecordingProgress};
