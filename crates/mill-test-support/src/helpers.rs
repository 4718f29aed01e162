//! Test helper functions and utilities

use mill_config::{ExecutionMode, SafeDeleteConfig};
use mill_foundation::Location;
use std::ops::Range;

/// Create a headless configuration for testing
pub fn create_test_config() -> SafeDeleteConfig {
    let mut config = SafeDeleteConfig::default();

    // Conflicts surface as errors instead of a dialog
    config.execution.mode = ExecutionMode::Headless;
    // Small queue so producer back-pressure is exercised
    config.search.channel_capacity = 2;
    config.logging.level = "debug".to_string();

    config
}

/// Shorthand for a location in `file`
pub fn location(file: &str, range: Range<usize>) -> Location {
    Location::new(file, range)
}
