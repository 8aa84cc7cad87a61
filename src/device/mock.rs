//! In-memory device for tests.
//!
//! Records every call and can be told to fail pushes, commands or pulls.
//! Pulls materialise a configurable timestamp log at the requested host path.

use super::DeviceTransfer;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock device for testing.
#[derive(Debug, Clone)]
pub struct MockDevice {
    inner: Arc<Mutex<MockDeviceInner>>,
}

#[derive(Debug)]
struct MockDeviceInner {
    push_count: usize,
    push_destinations: BTreeSet<String>,
    commands: Vec<String>,
    pulls: Vec<(String, PathBuf)>,
    log_content: String,
    push_delay: Duration,
    fail_pushes: bool,
    fail_commands: bool,
    fail_pulls: bool,
    worker_gauge: Option<Arc<AtomicUsize>>,
    observed_workers: Vec<usize>,
}

impl Default for MockDeviceInner {
    fn default() -> Self {
        Self {
            push_count: 0,
            push_destinations: BTreeSet::new(),
            commands: Vec::new(),
            pulls: Vec::new(),
            log_content: "10\n12\n15\n".to_string(),
            push_delay: Duration::from_millis(1),
            fail_pushes: false,
            fail_commands: false,
            fail_pulls: false,
            worker_gauge: None,
            observed_workers: Vec::new(),
        }
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDevice {
    /// Create a new mock device.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockDeviceInner::default())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockDeviceInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Content written to the host file on every successful pull.
    pub fn set_log_content<S: Into<String>>(&self, content: S) {
        self.lock().log_content = content.into();
    }

    /// How long each push takes; pushes always yield to the runtime.
    pub fn set_push_delay(&self, delay: Duration) {
        self.lock().push_delay = delay;
    }

    pub fn fail_pushes(&self, fail: bool) {
        self.lock().fail_pushes = fail;
    }

    pub fn fail_commands(&self, fail: bool) {
        self.lock().fail_commands = fail;
    }

    pub fn fail_pulls(&self, fail: bool) {
        self.lock().fail_pulls = fail;
    }

    /// Sample this gauge every time a remote command runs.
    pub fn observe_workers(&self, gauge: Arc<AtomicUsize>) {
        self.lock().worker_gauge = Some(gauge);
    }

    /// Gauge values seen by each remote command, in call order.
    pub fn observed_workers(&self) -> Vec<usize> {
        self.lock().observed_workers.clone()
    }

    pub fn push_count(&self) -> usize {
        self.lock().push_count
    }

    pub fn push_destinations(&self) -> BTreeSet<String> {
        self.lock().push_destinations.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    pub fn pulls(&self) -> Vec<(String, PathBuf)> {
        self.lock().pulls.clone()
    }

    /// Clear recorded calls, keeping failure switches and content.
    pub fn reset_history(&self) {
        let mut inner = self.lock();
        inner.push_count = 0;
        inner.push_destinations.clear();
        inner.commands.clear();
        inner.pulls.clear();
        inner.observed_workers.clear();
    }
}

#[async_trait]
impl DeviceTransfer for MockDevice {
    async fn push(&self, _local: &Path, remote: &str) -> bool {
        let (delay, fail) = {
            let mut inner = self.lock();
            inner.push_count += 1;
            inner.push_destinations.insert(remote.to_string());
            (inner.push_delay, inner.fail_pushes)
        };

        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
        !fail
    }

    async fn pull(&self, remote: &str, local: &Path) -> bool {
        let (content, fail) = {
            let mut inner = self.lock();
            inner.pulls.push((remote.to_string(), local.to_path_buf()));
            (inner.log_content.clone(), inner.fail_pulls)
        };

        if fail {
            return false;
        }
        std::fs::write(local, content).is_ok()
    }

    async fn run_remote_command(&self, command: &str) -> bool {
        let mut inner = self.lock();
        inner.commands.push(command.to_string());
        if let Some(gauge) = inner.worker_gauge.clone() {
            inner.observed_workers.push(gauge.load(Ordering::SeqCst));
        }
        !inner.fail_commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let device = MockDevice::new();
        assert!(device.push(Path::new("small.txt"), "/data/local/tmp/small.txt0").await);
        assert!(device.push(Path::new("small.txt"), "/data/local/tmp/small.txt0").await);
        assert!(device.run_remote_command("cd /data/local/tmp; ./timing").await);

        assert_eq!(device.push_count(), 2);
        assert_eq!(device.push_destinations().len(), 1);
        assert_eq!(device.commands(), vec!["cd /data/local/tmp; ./timing".to_string()]);
    }

    #[tokio::test]
    async fn test_pull_writes_log_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("timestamps_0.txt");

        let device = MockDevice::new();
        device.set_log_content("1\n2\n");
        assert!(device.pull("/data/local/tmp/logs.txt", &target).await);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "1\n2\n");

        device.fail_pulls(true);
        assert!(!device.pull("/data/local/tmp/logs.txt", &target).await);
        assert_eq!(device.pulls().len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let device = MockDevice::new();
        device.fail_pushes(true);
        device.fail_commands(true);
        assert!(!device.push(Path::new("a"), "/b").await);
        assert!(!device.run_remote_command("ls").await);

        device.reset_history();
        assert_eq!(device.push_count(), 0);
        assert!(device.commands().is_empty());
    }

    #[tokio::test]
    async fn test_observes_gauge_on_command() {
        let device = MockDevice::new();
        let gauge = Arc::new(AtomicUsize::new(5));
        device.observe_workers(gauge.clone());
        device.run_remote_command("a").await;
        gauge.store(0, Ordering::SeqCst);
        device.run_remote_command("b").await;
        assert_eq!(device.observed_workers(), vec![5, 0]);
    }
}
