//! Common test utilities for launcher integration tests

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
