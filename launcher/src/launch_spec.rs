//! Launch request and launch invocation building
//!
//! A worker is never started directly. The launcher runs a platform wrapper
//! script (`launchtools/generic-launcher.{sh,bat}`) with positional
//! arguments:
//!
//! ```text
//! <wrapper> <device_id> <script_dir> <script_file> <extra_args> <py|shellexec> <interpreter|none>
//! ```
//!
//! Building the invocation is deterministic apart from the interpreter
//! lookup for Python scripts, which checks for files next to the script.

use std::path::{Path, PathBuf};

use crate::validation::{after_last, before_last};

/// Placeholder in extra arguments replaced by the allocated port
pub const PORT_PLACEHOLDER: &str = "{PORT}";

pub const WINDOWS_WRAPPER: &str = "generic-launcher.bat";
pub const UNIX_WRAPPER: &str = "generic-launcher.sh";

pub const SELECTOR_PYTHON: &str = "py";
pub const SELECTOR_SHELLEXEC: &str = "shellexec";
pub const NO_INTERPRETER: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn wrapper_name(&self) -> &'static str {
        match self {
            Platform::Windows => WINDOWS_WRAPPER,
            Platform::Unix => UNIX_WRAPPER,
        }
    }
}

/// Everything a caller supplies to start one worker
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    /// Short worker name used in logs
    pub label: String,
    /// Start script; blank means the worker is disabled
    pub script: String,
    pub device_id: u32,
    /// Free-form arguments, may contain [`PORT_PLACEHOLDER`]
    pub extra_args: String,
    pub platform: Platform,
}

impl LaunchRequest {
    pub fn new(label: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            script: script.into(),
            device_id: 0,
            extra_args: String::new(),
            platform: Platform::current(),
        }
    }

    pub fn with_device_id(mut self, device_id: u32) -> Self {
        self.device_id = device_id;
        self
    }

    pub fn with_extra_args(mut self, extra_args: impl Into<String>) -> Self {
        self.extra_args = extra_args.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.script.trim().is_empty()
    }

    /// Script path with `/` separators
    pub fn normalized_path(&self) -> String {
        self.script.replace('\\', "/")
    }

    /// Text after the last `.` of the script path
    pub fn extension(&self) -> String {
        after_last(&self.normalized_path(), '.').to_string()
    }

    pub fn is_python(&self) -> bool {
        self.script.ends_with(".py")
    }
}

/// Concrete invocation for one launch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl LaunchSpec {
    /// Selector token (`py` or `shellexec`)
    pub fn selector(&self) -> Option<&str> {
        self.args
            .iter()
            .rev()
            .find(|a| *a == SELECTOR_PYTHON || *a == SELECTOR_SHELLEXEC)
            .map(String::as_str)
    }
}

/// Inputs to [`build_launch_spec`] that come from launcher configuration
#[derive(Debug, Clone, Copy)]
pub struct LaunchOptions<'a> {
    pub explicit_shell: Option<&'a str>,
    pub launch_tools_dir: &'a Path,
    pub working_dir: &'a Path,
}

/// Directory part of a `/`-separated path, empty when there is none
///
/// A root directory keeps its separator (`/` or `C:/`).
fn script_dir(path: &str) -> &str {
    let Some(idx) = path.rfind('/') else {
        return "";
    };
    let dir = &path[..idx];
    let is_drive = dir.len() == 2 && dir.ends_with(':');
    if dir.is_empty() || is_drive {
        &path[..=idx]
    } else {
        dir
    }
}

fn wrapper_path(launch_tools_dir: &Path, platform: Platform) -> String {
    let dir = launch_tools_dir.to_string_lossy().replace('\\', "/");
    let dir = dir.trim_end_matches('/');
    format!("{}/{}", dir, platform.wrapper_name())
}

/// Join `dir` and `rest` the way the wrapper will see them
fn join_script_relative(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        rest.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{rest}")
    } else {
        format!("{dir}/{rest}")
    }
}

fn exists_from(working_dir: &Path, candidate: &str) -> bool {
    working_dir.join(candidate).is_file()
}

/// Pick the interpreter handed to the wrapper for a Python script
pub fn resolve_python(dir: &str, platform: Platform, working_dir: &Path) -> String {
    match platform {
        Platform::Windows => {
            let venv = join_script_relative(dir, "venv/Scripts/python.exe");
            if exists_from(working_dir, &venv) {
                return venv;
            }
            let embedded = join_script_relative(dir, "../python_embeded/python.exe");
            if exists_from(working_dir, &embedded) {
                return std::fs::canonicalize(working_dir.join(&embedded))
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or(embedded);
            }
            "python".to_string()
        }
        Platform::Unix => {
            let venv = join_script_relative(dir, "venv/bin/python");
            if exists_from(working_dir, &venv) {
                return venv;
            }
            "python3".to_string()
        }
    }
}

/// Build the wrapper invocation for `request` on `port`
pub fn build_launch_spec(request: &LaunchRequest, port: u16, options: LaunchOptions<'_>) -> LaunchSpec {
    let path = request.normalized_path();
    let wrapper = wrapper_path(options.launch_tools_dir, request.platform);

    let mut args = Vec::new();
    let program = match options.explicit_shell {
        Some(shell) => {
            args.push(wrapper);
            shell.to_string()
        }
        None => wrapper,
    };

    let dir = script_dir(&path);
    args.push(request.device_id.to_string());
    args.push(dir.to_string());
    args.push(after_last(&path, '/').to_string());
    args.push(
        request
            .extra_args
            .replace(PORT_PLACEHOLDER, &port.to_string())
            .trim()
            .to_string(),
    );

    if request.is_python() {
        args.push(SELECTOR_PYTHON.to_string());
        args.push(resolve_python(dir, request.platform, options.working_dir));
    } else {
        args.push(SELECTOR_SHELLEXEC.to_string());
        args.push(NO_INTERPRETER.to_string());
    }

    LaunchSpec {
        program,
        args,
        working_dir: options.working_dir.to_path_buf(),
    }
}
