//! Launcher configuration
//!
//! Values come from, in increasing precedence: built-in defaults, the
//! environment (a `.env` file is loaded first if present), and CLI flags
//! applied through the fluent setters.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LauncherError, LauncherResult};

/// First port handed to a launched worker
pub const DEFAULT_BASE_PORT: u16 = 7820;

/// Delay between readiness probes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub const ENV_EXPLICIT_SHELL: &str = "SELFSTART_EXPLICIT_SHELL";
pub const ENV_BASE_PORT: &str = "SELFSTART_BASE_PORT";
pub const ENV_LAUNCH_TOOLS_DIR: &str = "SELFSTART_LAUNCH_TOOLS_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct LauncherConfig {
    /// Port given to the first launch; each launch takes the next one
    pub base_port: u16,

    /// Program that runs the wrapper script instead of executing it directly
    pub explicit_shell: Option<String>,

    /// Directory holding `generic-launcher.sh` / `generic-launcher.bat`
    pub launch_tools_dir: PathBuf,

    /// Working directory of spawned wrappers
    pub working_dir: PathBuf,

    pub poll_interval: Duration,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            base_port: DEFAULT_BASE_PORT,
            explicit_shell: None,
            launch_tools_dir: PathBuf::from("./launchtools"),
            working_dir: PathBuf::from("."),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl LauncherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from the process environment
    ///
    /// Reads `.env` from the current directory or its parents if present.
    /// Variables already set in the environment win over the file.
    pub fn from_env() -> LauncherResult<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> LauncherResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(shell) = lookup(ENV_EXPLICIT_SHELL).filter(|s| !s.trim().is_empty()) {
            config.explicit_shell = Some(shell);
        }

        if let Some(port) = lookup(ENV_BASE_PORT) {
            config.base_port = port
                .trim()
                .parse()
                .map_err(|e| LauncherError::config(format!("{ENV_BASE_PORT}={port}: {e}")))?;
        }

        if let Some(dir) = lookup(ENV_LAUNCH_TOOLS_DIR).filter(|s| !s.trim().is_empty()) {
            config.launch_tools_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Configure base port (fluent API)
    pub fn with_base_port(mut self, base_port: u16) -> Self {
        self.base_port = base_port;
        self
    }

    /// Configure explicit shell override (fluent API)
    pub fn with_explicit_shell(mut self, shell: Option<String>) -> Self {
        self.explicit_shell = shell;
        self
    }

    /// Configure wrapper script directory (fluent API)
    pub fn with_launch_tools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.launch_tools_dir = dir.into();
        self
    }

    /// Configure working directory of spawned wrappers (fluent API)
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Configure readiness poll interval (fluent API)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
