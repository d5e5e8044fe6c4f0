//! Launcher-specific error types

use shared::{SharedError, WorkerStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Failed to spawn worker process {label}: {message}")]
    SpawnFailed { label: String, message: String },

    #[error("Worker {label} stopped as {status}")]
    WorkerStopped { label: String, status: WorkerStatus },

    #[error("Timed out after {seconds}s waiting for worker {label} to stop")]
    ShutdownTimeout { label: String, seconds: u64 },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LauncherError {
    pub fn config(field: impl Into<String>) -> Self {
        LauncherError::ConfigurationError { field: field.into() }
    }

    pub fn spawn(label: impl Into<String>, err: impl std::fmt::Display) -> Self {
        LauncherError::SpawnFailed {
            label: label.into(),
            message: err.to_string(),
        }
    }
}

pub type LauncherResult<T> = Result<T, LauncherError>;
