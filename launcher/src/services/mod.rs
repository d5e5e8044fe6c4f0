//! Service implementations
//!
//! The supervisor and its output monitor, plus the HTTP backend used by the
//! `launcher` binary.

pub mod http_backend;
pub mod process_output_handler;
pub mod supervisor;

// Re-export all service implementations
pub use http_backend::HttpWorkerBackend;
pub use process_output_handler::SupervisedProcess;
pub use supervisor::{PortCounter, SelfStartSupervisor};
