//! Trait definitions with mockall annotations for testing
//!
//! A host application plugs each kind of worker into the supervisor by
//! implementing [`WorkerBackend`] once. The supervisor never knows what the
//! worker is; it only drives the status and calls back into the backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::status::StatusChannel;

/// Handle a host can use to terminate a launched worker
#[derive(Debug, Clone, Default)]
pub struct KillSwitch {
    notify: Arc<Notify>,
    triggered: Arc<AtomicBool>,
}

impl KillSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the output monitor to kill the process
    pub fn kill(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolves once [`KillSwitch::kill`] has been called
    pub async fn triggered(&self) {
        if self.is_triggered() {
            return;
        }
        self.notify.notified().await;
    }
}

/// What the host learns about a process right after it is spawned
#[derive(Debug, Clone)]
pub struct ProcessRegistration {
    pub port: u16,
    pub pid: Option<u32>,
    pub kill_switch: KillSwitch,
}

/// Per-backend capabilities the supervisor needs
///
/// Implementations own the worker's [`StatusChannel`]. `probe` is expected to
/// advance the status to `Running` itself once the worker answers.
#[mockall::automock]
#[async_trait::async_trait]
pub trait WorkerBackend: Send + Sync {
    /// Status shared with the host
    fn status(&self) -> &StatusChannel;

    /// Readiness check against the worker on `port`
    ///
    /// Returns true when the worker answered. Failures are not errors; the
    /// poll loop simply tries again.
    async fn probe(&self, port: u16) -> bool;

    /// One line of the wrapper's standard output
    fn on_output_line(&self, line: &str);

    /// Called once per launch, right after the process is spawned
    fn register_process(&self, process: ProcessRegistration);
}
