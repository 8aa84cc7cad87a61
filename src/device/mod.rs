//! Host to guest device transfers
//!
//! Everything the benchmark does to the guest goes through [`DeviceTransfer`]:
//! pushing contention payloads, running the timing program and pulling its
//! log back. Calls are synchronous from the caller's point of view and
//! best-effort; nothing here retries.

pub mod mock;

pub use mock::MockDevice;

use crate::models::Config;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Best-effort file transfer and command execution on a guest device
#[async_trait]
pub trait DeviceTransfer: Send + Sync {
    /// Copy a host file to the guest; `true` on success
    async fn push(&self, local: &Path, remote: &str) -> bool;

    /// Copy a guest file to the host; `true` on success
    async fn pull(&self, remote: &str, local: &Path) -> bool;

    /// Run a shell command on the guest; `true` if it exited cleanly
    async fn run_remote_command(&self, command: &str) -> bool;
}

/// [`DeviceTransfer`] backed by the `adb` command line tool
#[derive(Debug, Clone)]
pub struct AdbDevice {
    adb_path: String,
    serial: Option<String>,
}

impl AdbDevice {
    pub fn new<S: Into<String>>(adb_path: S, serial: Option<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
            serial,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.adb_path.clone(), config.device_serial.clone())
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Base `adb` invocation with the device selector applied
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.adb_path);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    async fn status_ok(mut cmd: Command) -> bool {
        match cmd.status().await {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl DeviceTransfer for AdbDevice {
    async fn push(&self, local: &Path, remote: &str) -> bool {
        let mut cmd = self.command();
        cmd.arg("push").arg(local).arg(remote);
        Self::status_ok(cmd).await
    }

    async fn pull(&self, remote: &str, local: &Path) -> bool {
        let mut cmd = self.command();
        cmd.arg("pull").arg(remote).arg(local);
        Self::status_ok(cmd).await
    }

    async fn run_remote_command(&self, command: &str) -> bool {
        let mut cmd = self.command();
        cmd.arg("shell").arg(command);
        Self::status_ok(cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adb_device_from_config() {
        let mut config = Config::default();
        config.device_serial = Some("emulator-5554".to_string());
        let device = AdbDevice::from_config(&config);
        assert_eq!(device.serial(), Some("emulator-5554"));
    }

    #[tokio::test]
    async fn test_missing_adb_binary_reports_failure() {
        let device = AdbDevice::new("/nonexistent/bin/adb-for-tests", None);
        assert!(!device.push(Path::new("Cargo.toml"), "/data/local/tmp/x").await);
        assert!(!device.pull("/data/local/tmp/logs.txt", Path::new("unused.txt")).await);
        assert!(!device.run_remote_command("true").await);
    }
}
