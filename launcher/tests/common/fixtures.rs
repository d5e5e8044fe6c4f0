//! Test fixtures and data for launcher tests
//!
//! Wrapper scripts stand in for `launchtools/generic-launcher.sh`; they are
//! run through an explicit `sh` so no execute bit is needed.

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const LABEL: &'static str = "test_worker";
    pub const BASE_PORT: u16 = 7820;
    pub const EXTRA_ARGS: &'static str = "--port {PORT}";
    pub const SCRIPT_NAME: &'static str = "run.sh";

    /// Echoes its arguments, then stays alive until killed
    pub const LONG_RUNNING_WRAPPER: &'static str = "#!/bin/sh\necho \"launching $*\"\nexec sleep 30\n";

    /// Prints a couple of lines and exits with a failure code
    pub const CRASHING_WRAPPER: &'static str = "#!/bin/sh\necho \"launching $*\"\necho boom\nexit 3\n";

    /// Announces itself, closes stdout and keeps running
    pub const SILENT_WRAPPER: &'static str = "#!/bin/sh\necho \"launching $*\"\nexec >/dev/null\nexec sleep 30\n";

    pub const WORKER_SCRIPT: &'static str = "#!/bin/sh\necho worker\n";
}
