//! Launcher library for self-started workers
//!
//! Validates a worker's start script, builds the wrapper invocation, starts
//! the process and polls a readiness probe until the worker is running or
//! has failed. A background monitor tails the worker's output and marks it
//! errored if it exits while loading or running.

pub mod config;
pub mod error;
pub mod launch_spec;
pub mod services;
pub mod status;
pub mod traits;
pub mod validation;

// Re-export commonly used types
pub use config::LauncherConfig;
pub use error::{LauncherError, LauncherResult};
pub use launch_spec::{build_launch_spec, LaunchOptions, LaunchRequest, LaunchSpec, Platform};
pub use services::{HttpWorkerBackend, PortCounter, SelfStartSupervisor};
pub use shared::WorkerStatus;
pub use status::StatusChannel;
pub use traits::{KillSwitch, MockWorkerBackend, ProcessRegistration, WorkerBackend};
pub use validation::{is_valid_start_path, is_valid_start_path_in};
