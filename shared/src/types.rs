//! Core shared types for supervised workers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a supervised worker
///
/// Exactly one value exists per worker. `Waiting` and `Idle` belong to the
/// host application; the launcher itself only ever writes `Disabled`,
/// `Loading` and `Errored`, and observes `Running` once a probe sets it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    #[default]
    Disabled,
    Waiting,
    Loading,
    Idle,
    Running,
    Errored,
}

impl WorkerStatus {
    /// States in which a process exit counts as a crash
    pub fn is_active(&self) -> bool {
        matches!(self, WorkerStatus::Loading | WorkerStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Disabled => "disabled",
            WorkerStatus::Waiting => "waiting",
            WorkerStatus::Loading => "loading",
            WorkerStatus::Idle => "idle",
            WorkerStatus::Running => "running",
            WorkerStatus::Errored => "errored",
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
