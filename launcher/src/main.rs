//! Main entry point for the launcher binary
//!
//! Self-starts a single HTTP worker, waits until it answers its ping path,
//! then keeps it alive until Ctrl+C or until the worker exits on its own.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;

use launcher::{
    HttpWorkerBackend, LaunchRequest, LauncherConfig, LauncherError, LauncherResult, SelfStartSupervisor,
    WorkerBackend, WorkerStatus,
};
use shared::{logging, worker_info, worker_warn};

/// How long Ctrl+C waits for the worker to exit after killing it
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Launch and supervise a self-started worker
#[derive(Parser)]
#[command(name = "launcher")]
#[command(about = "Starts a worker through the generic launch wrapper and waits until it is ready")]
pub struct Args {
    /// Start script of the worker (.sh, .bat or .py)
    #[arg(long)]
    pub script: String,

    /// Worker name used in logs
    #[arg(long, default_value = "worker")]
    pub label: String,

    /// Device (GPU) id passed to the wrapper
    #[arg(long, default_value = "0")]
    pub device_id: u32,

    /// Extra arguments for the worker; {PORT} is replaced by the assigned port
    #[arg(long, default_value = "--port {PORT}", allow_hyphen_values = true)]
    pub extra_args: String,

    /// HTTP path probed for readiness
    #[arg(long, default_value = "/")]
    pub ping_path: String,

    /// First port to assign (overrides SELFSTART_BASE_PORT)
    #[arg(long)]
    pub base_port: Option<u16>,

    /// Shell that runs the wrapper script (overrides SELFSTART_EXPLICIT_SHELL)
    #[arg(long)]
    pub explicit_shell: Option<String>,

    /// Directory containing the wrapper scripts (overrides SELFSTART_LAUNCH_TOOLS_DIR)
    #[arg(long)]
    pub launch_tools_dir: Option<String>,

    /// Milliseconds between readiness probes
    #[arg(long, default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    fn apply_to(&self, base: LauncherConfig) -> LauncherConfig {
        let mut config = base.with_poll_interval(Duration::from_millis(self.poll_interval_ms));
        if let Some(port) = self.base_port {
            config = config.with_base_port(port);
        }
        if self.explicit_shell.is_some() {
            config = config.with_explicit_shell(self.explicit_shell.clone());
        }
        if let Some(dir) = &self.launch_tools_dir {
            config = config.with_launch_tools_dir(dir);
        }
        config
    }
}

#[tokio::main]
async fn main() -> LauncherResult<()> {
    let args = Args::parse();

    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(&args.label, &format!("self-start of {}", args.script));

    let config = args.apply_to(LauncherConfig::from_env()?);
    let supervisor = SelfStartSupervisor::new(config);

    let backend = Arc::new(HttpWorkerBackend::new(args.label.clone())?.with_ping_path(args.ping_path.clone()));
    let request = LaunchRequest::new(args.label.clone(), args.script.clone())
        .with_device_id(args.device_id)
        .with_extra_args(args.extra_args.clone());

    let status = match supervisor.launch(&request, Arc::clone(&backend)).await {
        Ok(status) => status,
        Err(e) => {
            logging::log_error(&args.label, "Launch", &e);
            return Err(e);
        }
    };

    match status {
        WorkerStatus::Running => {
            logging::log_success(&args.label, "Worker is running, press Ctrl+C to stop");
        }
        WorkerStatus::Disabled => {
            worker_info!(args.label, "No start script configured, nothing to do");
            return Ok(());
        }
        other => {
            worker_warn!(args.label, "Worker ended launch as {}", other);
            return Err(LauncherError::WorkerStopped {
                label: args.label.clone(),
                status: other,
            });
        }
    }

    tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => logging::log_shutdown(&args.label, "Received Ctrl+C signal"),
                Err(err) => logging::log_error(&args.label, "Signal handling", &err),
            }
            if let Some(registration) = backend.registration() {
                registration.kill_switch.kill();
            }
            // The kill surfaces as an exit; wait for the monitor to record it
            let stopped = tokio::time::timeout(
                SHUTDOWN_TIMEOUT,
                backend.status().wait_until(|s| !s.is_active()),
            )
            .await;
            match stopped {
                Ok(final_status) => {
                    worker_info!(args.label, "Worker stopped as {}", final_status);
                    Ok(())
                }
                Err(_) => {
                    let err = LauncherError::ShutdownTimeout {
                        label: args.label.clone(),
                        seconds: SHUTDOWN_TIMEOUT.as_secs(),
                    };
                    logging::log_error(&args.label, "Shutdown", &err);
                    Err(err)
                }
            }
        }
        final_status = backend.status().wait_until(|s| !s.is_active()) => {
            worker_warn!(args.label, "Worker stopped on its own as {}", final_status);
            Err(LauncherError::WorkerStopped {
                label: args.label.clone(),
                status: final_status,
            })
        }
    }
}
