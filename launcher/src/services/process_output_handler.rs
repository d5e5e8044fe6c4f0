//! Helper to handle child process output and exit
//!
//! The wrapper's stdout is piped and tailed line by line by a background
//! task. When the stream closes the process is reaped and the worker status
//! is reconciled: an exit while loading or running always counts as a crash.

use std::process::Stdio;
use std::sync::Arc;

use shared::{worker_debug, worker_info, worker_warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::traits::{KillSwitch, WorkerBackend};

/// Configure stdio for a wrapper process
///
/// Only stdout is captured; stderr goes straight to the launcher's stderr.
pub fn configure_child_stdio(cmd: &mut Command) {
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .stdin(Stdio::null());
}

/// A spawned worker owned by its monitor task
pub struct SupervisedProcess {
    pub child: Child,
    pub label: String,
    pub port: u16,
}

/// Spawn the task that tails stdout and detects the worker's exit
pub fn spawn_output_monitor<B>(
    process: SupervisedProcess,
    backend: Arc<B>,
    kill_switch: KillSwitch,
) -> JoinHandle<()>
where
    B: WorkerBackend + ?Sized + 'static,
{
    tokio::spawn(monitor_loop(process, backend, kill_switch))
}

async fn monitor_loop<B>(process: SupervisedProcess, backend: Arc<B>, kill_switch: KillSwitch)
where
    B: WorkerBackend + ?Sized + 'static,
{
    let SupervisedProcess {
        mut child,
        label,
        port,
    } = process;

    let mut kill_requested = false;

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => backend.on_output_line(&line),
                    Ok(None) => break,
                    Err(e) => {
                        worker_warn!(label, "Reading output of {} failed: {}", label, e);
                        break;
                    }
                },
                _ = kill_switch.triggered(), if !kill_requested => {
                    kill_requested = true;
                    kill_child(&mut child, &label, port);
                }
            }
        }
    }

    // A worker may close its stdout and keep running; the kill switch still applies
    let exit = tokio::select! {
        exit = child.wait() => exit,
        _ = kill_switch.triggered(), if !kill_requested => {
            kill_child(&mut child, &label, port);
            child.wait().await
        }
    };

    match exit {
        Ok(exit) => worker_debug!(label, "{} process exited with {}", label, exit),
        Err(e) => worker_warn!(label, "Failed to reap {}: {}", label, e),
    }

    let (previous, forced) = backend.status().fail_if_active();
    worker_debug!(label, "Status of {} after process end is {}", label, previous);
    if forced {
        worker_warn!(
            label,
            "❌ Self-start {} on port {} exited unexpectedly while {}",
            label,
            port,
            previous
        );
    }
    worker_info!(label, "Self-start {} on port {} exited.", label, port);
}

fn kill_child(child: &mut Child, label: &str, port: u16) {
    worker_info!(label, "🛑 Killing self-start {} on port {}", label, port);
    if let Err(e) = child.start_kill() {
        worker_warn!(label, "Failed to kill {}: {}", label, e);
    }
}
