//! HTTP readiness backend
//!
//! Used by the `launcher` binary for workers that serve HTTP once loaded.
//! A probe succeeds when `GET http://<host>:<port><ping_path>` returns a
//! success status with a body that is not a server fault.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use shared::http::{make_http_client, parse_text};
use shared::{worker_debug, WorkerStatus};

use crate::error::LauncherResult;
use crate::status::StatusChannel;
use crate::traits::{ProcessRegistration, WorkerBackend};

pub struct HttpWorkerBackend {
    label: String,
    host: String,
    ping_path: String,
    client: Client,
    status: StatusChannel,
    process: Mutex<Option<ProcessRegistration>>,
}

impl HttpWorkerBackend {
    pub fn new(label: impl Into<String>) -> LauncherResult<Self> {
        Ok(Self {
            label: label.into(),
            host: "127.0.0.1".to_string(),
            ping_path: "/".to_string(),
            client: make_http_client()?,
            status: StatusChannel::new(WorkerStatus::Disabled),
            process: Mutex::new(None),
        })
    }

    /// Configure probe host (fluent API)
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Configure probe path (fluent API)
    pub fn with_ping_path(mut self, ping_path: impl Into<String>) -> Self {
        let ping_path = ping_path.into();
        self.ping_path = if ping_path.starts_with('/') {
            ping_path
        } else {
            format!("/{ping_path}")
        };
        self
    }

    pub fn probe_url(&self, port: u16) -> String {
        format!("http://{}:{}{}", self.host, port, self.ping_path)
    }

    /// Registration of the most recent launch, if any
    pub fn registration(&self) -> Option<ProcessRegistration> {
        self.process.lock().ok().and_then(|guard| guard.clone())
    }

    async fn ping(&self, port: u16) -> LauncherResult<()> {
        let response = self
            .client
            .get(self.probe_url(port))
            .send()
            .await
            .map_err(shared::SharedError::from)?
            .error_for_status()
            .map_err(shared::SharedError::from)?;
        parse_text(response).await?;
        Ok(())
    }
}

#[async_trait]
impl WorkerBackend for HttpWorkerBackend {
    fn status(&self) -> &StatusChannel {
        &self.status
    }

    async fn probe(&self, port: u16) -> bool {
        match self.ping(port).await {
            Ok(()) => self.status.transition(WorkerStatus::Loading, WorkerStatus::Running),
            Err(e) => {
                worker_debug!(self.label, "{} not ready yet: {}", self.label, e);
                false
            }
        }
    }

    fn on_output_line(&self, line: &str) {
        worker_debug!(self.label, "{} launcher: {}", self.label, line);
    }

    fn register_process(&self, process: ProcessRegistration) {
        if let Ok(mut guard) = self.process.lock() {
            *guard = Some(process);
        }
    }
}
