//! Shared types for the self-start launcher
//!
//! Holds what both the launcher library and readiness probes need: the worker
//! status model, logging setup and the HTTP response decoders.

pub mod errors;
pub mod http;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
