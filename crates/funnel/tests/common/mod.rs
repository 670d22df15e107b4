//! Common utilities for integration tests

pub mod fixtures;
pub mod walker;

// Re-export commonly used items
pub use fixtures::{init_tracing, Fixture, Layout};
pub use walker::ImportWalker;
