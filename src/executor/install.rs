//! Build and install the guest timing program

use crate::device::DeviceTransfer;
use crate::error::{AppError, Result};
use crate::models::Config;
use crate::types::ClockType;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Compiles the timing program for one clock and pushes it to the guest
pub struct TimingInstaller {
    compiler: String,
    source: PathBuf,
    guest_exec_path: String,
    device: Arc<dyn DeviceTransfer>,
}

impl TimingInstaller {
    pub fn new(config: &Config, device: Arc<dyn DeviceTransfer>) -> Self {
        Self {
            compiler: config.timing_compiler.clone(),
            source: config.timing_source.clone(),
            guest_exec_path: config.guest_exec_path(),
            device,
        }
    }

    /// Host path of the compiled program, next to its source
    pub fn host_exec_path(&self) -> PathBuf {
        let dir = self.source.parent().unwrap_or_else(|| Path::new(""));
        dir.join(crate::defaults::GUEST_EXEC_NAME)
    }

    /// Run `<compiler> <source> <output> <CLOCK>`
    pub async fn compile(&self, clock: ClockType) -> Result<PathBuf> {
        if !self.source.exists() {
            return Err(AppError::config(format!(
                "Timing program source not found: {}",
                self.source.display()
            )));
        }

        let output = self.host_exec_path();
        let status = Command::new(&self.compiler)
            .arg(&self.source)
            .arg(&output)
            .arg(clock.as_str())
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| AppError::benchmark(format!("Failed to run compiler '{}': {}", self.compiler, e)))?;

        if !status.success() {
            return Err(AppError::benchmark(format!(
                "Compiling {} for {} failed with {}",
                self.source.display(),
                clock,
                status
            )));
        }
        Ok(output)
    }

    /// Push an already built program to the guest
    pub async fn push(&self, exec: &Path) -> Result<()> {
        if self.device.push(exec, &self.guest_exec_path).await {
            Ok(())
        } else {
            Err(AppError::device(format!(
                "Failed to push {} to {}",
                exec.display(),
                self.guest_exec_path
            )))
        }
    }

    pub async fn install(&self, clock: ClockType) -> Result<PathBuf> {
        let exec = self.compile(clock).await?;
        self.push(&exec).await?;
        Ok(exec)
    }
}
