//! Test helpers and builder patterns for launcher tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use launcher::{
    LaunchRequest, LauncherConfig, MockWorkerBackend, ProcessRegistration, SelfStartSupervisor,
    StatusChannel, WorkerStatus,
};
use tempfile::TempDir;

use super::fixtures::TestFixtures;

/// Temporary directory holding a wrapper script and a worker script
pub struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    pub fn new(wrapper: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let tools = dir.path().join("launchtools");
        std::fs::create_dir_all(&tools).unwrap();
        std::fs::write(tools.join("generic-launcher.sh"), wrapper).unwrap();
        std::fs::write(dir.path().join(TestFixtures::SCRIPT_NAME), TestFixtures::WORKER_SCRIPT).unwrap();
        Self { dir }
    }

    pub fn script_path(&self) -> String {
        self.dir
            .path()
            .join(TestFixtures::SCRIPT_NAME)
            .to_string_lossy()
            .into_owned()
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.dir.path().join("launchtools")
    }

    pub fn supervisor(&self, poll_interval: Duration) -> SelfStartSupervisor {
        let config = LauncherConfig::new()
            .with_base_port(TestFixtures::BASE_PORT)
            .with_explicit_shell(Some("sh".to_string()))
            .with_launch_tools_dir(self.tools_dir())
            .with_working_dir(self.dir.path())
            .with_poll_interval(poll_interval);
        SelfStartSupervisor::new(config)
    }

    pub fn request(&self) -> LaunchRequest {
        LaunchRequest::new(TestFixtures::LABEL, self.script_path())
            .with_device_id(1)
            .with_extra_args(TestFixtures::EXTRA_ARGS)
    }
}

/// Everything a test wants to observe about a mock backend
#[derive(Clone, Default)]
pub struct BackendRecorder {
    pub status: StatusChannel,
    pub probes: Arc<AtomicUsize>,
    pub lines: Arc<Mutex<Vec<String>>>,
    pub registration: Arc<Mutex<Option<ProcessRegistration>>>,
}

impl BackendRecorder {
    pub fn new() -> Self {
        Self {
            status: StatusChannel::new(WorkerStatus::Idle),
            ..Default::default()
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn kill(&self) {
        let registration = self.registration.lock().unwrap().clone();
        registration.expect("process was registered").kill_switch.kill();
    }

    /// Wait for the status to satisfy `predicate`, failing the test after a few seconds
    pub async fn wait_for(&self, predicate: impl FnMut(WorkerStatus) -> bool) -> WorkerStatus {
        tokio::time::timeout(Duration::from_secs(5), self.status.wait_until(predicate))
            .await
            .expect("status did not settle in time")
    }
}

/// Builder for mock backends with recording defaults
pub struct BackendBuilder {
    recorder: BackendRecorder,
    mock: MockWorkerBackend,
}

impl BackendBuilder {
    pub fn new() -> Self {
        let recorder = BackendRecorder::new();
        let mut mock = MockWorkerBackend::new();

        mock.expect_status().return_const(recorder.status.clone());

        let lines = Arc::clone(&recorder.lines);
        mock.expect_on_output_line()
            .returning(move |line| lines.lock().unwrap().push(line.to_string()))
            .times(0..);

        let registration = Arc::clone(&recorder.registration);
        mock.expect_register_process()
            .times(1)
            .returning(move |process| *registration.lock().unwrap() = Some(process));

        Self { recorder, mock }
    }

    /// Probe answers with `outcome(call_number, status)`; call numbers start at 1
    pub fn with_probe<F>(mut self, mut outcome: F) -> Self
    where
        F: FnMut(usize, &StatusChannel) -> bool + Send + 'static,
    {
        let probes = Arc::clone(&self.recorder.probes);
        let status = self.recorder.status.clone();
        self.mock.expect_probe().returning(move |_port| {
            let call = probes.fetch_add(1, Ordering::SeqCst) + 1;
            outcome(call, &status)
        });
        self
    }

    /// Probe must never be called
    pub fn without_probe(mut self) -> Self {
        self.mock.expect_probe().times(0);
        self
    }

    pub fn build(self) -> (Arc<MockWorkerBackend>, BackendRecorder) {
        (Arc::new(self.mock), self.recorder)
    }
}

impl Default for BackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}
