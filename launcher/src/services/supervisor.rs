//! Self-start supervisor
//!
//! Launches a worker through the generic wrapper script, then waits for it
//! to come up:
//!
//! ```text
//! Disabled ──(no script)
//! Loading ──probe ok──▶ Running
//!    │                     │
//!    └──────exit───────────┴──▶ Errored
//! ```
//!
//! The launch call returns once the worker leaves `Loading`. The output
//! monitor keeps running and turns a later crash into `Errored`.

use std::sync::Arc;

use shared::{worker_debug, worker_error, worker_info, WorkerStatus};
use tokio::process::Command;
use tokio::sync::Mutex;

use crate::config::LauncherConfig;
use crate::error::{LauncherError, LauncherResult};
use crate::launch_spec::{build_launch_spec, LaunchOptions, LaunchRequest, LaunchSpec};
use crate::services::process_output_handler::{configure_child_stdio, spawn_output_monitor, SupervisedProcess};
use crate::traits::{KillSwitch, ProcessRegistration, WorkerBackend};
use crate::validation::is_valid_start_path_in;

/// Hands out one port per launch attempt, never reusing one
#[derive(Debug)]
pub struct PortCounter {
    next_port: Mutex<u16>,
}

impl PortCounter {
    pub fn new(base_port: u16) -> Self {
        Self {
            next_port: Mutex::new(base_port),
        }
    }

    /// Get next available port
    pub async fn next(&self) -> LauncherResult<u16> {
        let mut port = self.next_port.lock().await;
        let current = *port;
        *port = current
            .checked_add(1)
            .ok_or_else(|| LauncherError::config("port range exhausted"))?;
        Ok(current)
    }
}

/// Launches and watches self-started workers
///
/// Construct one per host process and share it; the port counter lives here.
pub struct SelfStartSupervisor {
    config: LauncherConfig,
    ports: PortCounter,
}

impl SelfStartSupervisor {
    pub fn new(config: LauncherConfig) -> Self {
        let ports = PortCounter::new(config.base_port);
        Self { config, ports }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Allocate a port and build the invocation for `request`
    pub async fn prepare(&self, request: &LaunchRequest) -> LauncherResult<(u16, LaunchSpec)> {
        let port = self.ports.next().await?;
        let options = LaunchOptions {
            explicit_shell: self.config.explicit_shell.as_deref(),
            launch_tools_dir: &self.config.launch_tools_dir,
            working_dir: &self.config.working_dir,
        };
        Ok((port, build_launch_spec(request, port, options)))
    }

    /// Launch `request` and wait until it is running or has failed
    ///
    /// Returns the status the worker settled in. Only a failure to spawn the
    /// process is returned as an error.
    pub async fn launch<B>(&self, request: &LaunchRequest, backend: Arc<B>) -> LauncherResult<WorkerStatus>
    where
        B: WorkerBackend + ?Sized + 'static,
    {
        let label = request.label.as_str();
        let status = backend.status().clone();

        if request.is_disabled() {
            status.revise(WorkerStatus::Disabled);
            return Ok(WorkerStatus::Disabled);
        }

        worker_debug!(
            label,
            "Requested generic launch of {} on GPU {} from {}",
            request.script,
            request.device_id,
            label
        );

        let path = request.normalized_path();
        if !is_valid_start_path_in(label, &path, &request.extension(), &self.config.working_dir) {
            status.revise(WorkerStatus::Errored);
            return Ok(WorkerStatus::Errored);
        }

        let (port, spec) = self.prepare(request).await?;
        match (spec.selector(), spec.args.last()) {
            (Some("py"), Some(python)) => worker_debug!(label, "Will use python: {}", python),
            _ => worker_debug!(label, "Will shellexec"),
        }

        status.revise(WorkerStatus::Loading);

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).current_dir(&spec.working_dir);
        configure_child_stdio(&mut cmd);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                worker_error!(label, "❌ Failed to start {} via {}: {}", label, spec.program, e);
                status.revise(WorkerStatus::Errored);
                return Err(LauncherError::spawn(label, e));
            }
        };

        let kill_switch = KillSwitch::new();
        backend.register_process(ProcessRegistration {
            port,
            pid: child.id(),
            kill_switch: kill_switch.clone(),
        });
        worker_info!(label, "Self-start {} on port {} is loading...", label, port);

        let process = SupervisedProcess {
            child,
            label: label.to_string(),
            port,
        };
        spawn_output_monitor(process, Arc::clone(&backend), kill_switch);

        let final_status = self.poll_until_settled(label, port, backend.as_ref()).await;
        worker_debug!(
            label,
            "{} self-start port {} loop ending as {}",
            label,
            port,
            final_status
        );
        Ok(final_status)
    }

    /// Probe the worker while it is loading
    ///
    /// Waits the poll interval between probes, but wakes early when the
    /// status changes so a crash seen by the monitor ends the loop at once.
    async fn poll_until_settled<B>(&self, label: &str, port: u16, backend: &B) -> WorkerStatus
    where
        B: WorkerBackend + ?Sized,
    {
        let mut status_rx = backend.status().subscribe();

        loop {
            if *status_rx.borrow_and_update() != WorkerStatus::Loading {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            if *status_rx.borrow_and_update() != WorkerStatus::Loading {
                break;
            }

            worker_debug!(label, "{} port {} checking for server...", label, port);
            if backend.probe(port).await {
                worker_info!(label, "✅ Self-start {} on port {} started.", label, port);
            }
        }

        backend.status().get()
    }
}
