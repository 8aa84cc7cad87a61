//! Benchmark execution
//!
//! This module contains:
//! - [`BenchmarkDriver`], which runs the measurement loop for one
//!   (clock, contention level) pair against a [`DeviceTransfer`]
//! - [`TimingInstaller`], which builds the guest timing program and
//!   pushes it to the device

pub mod install;

pub use install::TimingInstaller;

use crate::{
    contention::{ContentionFiles, ContentionManager, ContentionWorkerPool},
    device::DeviceTransfer,
    error::{ErrorContext, Result},
    logging::BenchmarkLogger,
    models::{BenchmarkReport, Config},
    stats::RunLayout,
    types::{ClockType, ContentionLevel},
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Per-run execution parameters derived from [`Config`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Measurement iterations per (clock, level) pair
    pub iterations: u32,
    /// Command that runs the timing program on the guest
    pub measurement_command: String,
    /// Guest log the timing program writes
    pub guest_log_path: String,
    pub verbose: bool,
    pub debug: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            iterations: crate::defaults::BENCHMARK_ITERATIONS,
            measurement_command: format!(
                "cd {}; ./{}",
                config.guest_work_dir,
                crate::defaults::GUEST_EXEC_NAME
            ),
            guest_log_path: config.guest_log_path(),
            verbose: config.verbose,
            debug: config.debug,
        }
    }
}

/// Runs the contention-bracketed measurement loop
pub struct BenchmarkDriver {
    config: Config,
    execution: ExecutionConfig,
    device: Arc<dyn DeviceTransfer>,
    workers: Arc<AtomicUsize>,
    logger: BenchmarkLogger,
}

impl BenchmarkDriver {
    pub fn new(config: Config, device: Arc<dyn DeviceTransfer>) -> Self {
        let execution = ExecutionConfig::from(&config);
        let logger = BenchmarkLogger::new(&config);
        Self {
            config,
            execution,
            device,
            workers: Arc::new(AtomicUsize::new(0)),
            logger,
        }
    }

    /// Use a logger created elsewhere, e.g. one sharing a session ID
    pub fn with_logger(mut self, logger: BenchmarkLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn execution(&self) -> &ExecutionConfig {
        &self.execution
    }

    /// Live contention workers across every run of this driver
    pub fn worker_gauge(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.workers)
    }

    /// Benchmark a clock under a contention level, both given by name.
    ///
    /// Names are validated before any directory, task or signal exists.
    pub async fn run(&self, clock: &str, level: &str) -> Result<BenchmarkReport> {
        let clock: ClockType = clock.parse()?;
        let level: ContentionLevel = level.parse()?;
        self.run_level(clock, level).await
    }

    /// Run every iteration for one (clock, level) pair.
    ///
    /// A failed measurement or pull is counted in the report and the loop
    /// carries on; handshake failures abort the run.
    pub async fn run_level(&self, clock: ClockType, level: ContentionLevel) -> Result<BenchmarkReport> {
        let layout = RunLayout::new(self.config.run_dir(clock, level)?);
        std::fs::create_dir_all(layout.raw_times())
            .with_context(|| format!("Failed to create {}", layout.raw_times().display()))?;

        let pool = ContentionWorkerPool::new(
            Arc::clone(&self.device),
            ContentionFiles::in_dir(&self.config.contention_dir),
            self.config.guest_work_dir.clone(),
        )
        .with_gauge(Arc::clone(&self.workers));
        let mut contention = ContentionManager::new(pool, level.counts()).spawn();

        let mut report = BenchmarkReport::new(clock, level);
        let total = self.execution.iterations;

        for index in 0..total {
            self.logger.log_iteration(index, total).await;

            contention.start_contention().await.context("Failed to start contention")?;
            self.logger.log_contention(index, true, contention.active_workers()).await;

            let measured = self.device.run_remote_command(&self.execution.measurement_command).await;

            contention.stop_contention().await.context("Failed to stop contention")?;
            self.logger.log_contention(index, false, contention.active_workers()).await;
            report.iterations += 1;

            if !measured {
                // The guest log may still hold the previous iteration
                report.failed_measurements += 1;
                report.failed_pulls += 1;
                self.logger
                    .log_transfer_failure(index, "measurement", &self.execution.measurement_command)
                    .await;
                continue;
            }

            let destination = layout.raw_log(u64::from(index));
            if !self.device.pull(&self.execution.guest_log_path, &destination).await {
                report.failed_pulls += 1;
                self.logger
                    .log_transfer_failure(index, "pull", &self.execution.guest_log_path)
                    .await;
            }
        }

        contention.shutdown().await.context("Failed to shut down contention manager")?;
        report.mark_completed();
        self.logger.log_report(&report).await;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MockDevice;
    use crate::error::AppError;
    use tempfile::TempDir;

    fn driver(device: &MockDevice) -> (BenchmarkDriver, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_root: dir.path().to_path_buf(),
            ..Config::default()
        };
        (BenchmarkDriver::new(config, Arc::new(device.clone())), dir)
    }

    #[test]
    fn test_execution_config_from_config() {
        let config = Config {
            guest_work_dir: "/sdcard/bench".to_string(),
            ..Config::default()
        };
        let execution = ExecutionConfig::from(&config);
        assert_eq!(execution.iterations, 100);
        assert_eq!(execution.measurement_command, "cd /sdcard/bench; ./timing");
        assert_eq!(execution.guest_log_path, "/sdcard/bench/logs.txt");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_high_contention_run() {
        let device = MockDevice::new();
        let (driver, dir) = driver(&device);
        device.observe_workers(driver.worker_gauge());

        let report = driver.run("kvm", "high").await.unwrap();
        assert_eq!(report.iterations, 100);
        assert!(report.is_clean());
        assert!(report.completed_at.is_some());

        let observed = device.observed_workers();
        assert_eq!(observed.len(), 100);
        assert!(observed.iter().all(|n| *n == 36), "partial contention observed: {:?}", observed);
        assert_eq!(driver.worker_gauge().load(std::sync::atomic::Ordering::SeqCst), 0);

        assert_eq!(device.pulls().len(), 100);
        let raw = dir.path().join("logs/KVM/HIGH/raw_times");
        assert!(raw.join("timestamps_0.txt").exists());
        assert!(raw.join("timestamps_99.txt").exists());
        assert!(device.commands().iter().all(|c| c == "cd /data/local/tmp; ./timing"));
    }

    #[tokio::test]
    async fn test_no_contention_run() {
        let device = MockDevice::new();
        let (driver, _dir) = driver(&device);
        device.observe_workers(driver.worker_gauge());

        let report = driver.run("TIME", "NONE").await.unwrap();
        assert_eq!(report.iterations, 100);
        assert!(device.observed_workers().iter().all(|n| *n == 0));
        assert_eq!(device.push_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_names_rejected_before_side_effects() {
        let device = MockDevice::new();
        let (driver, dir) = driver(&device);

        let err = driver.run("FOO", "HIGH").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        let err = driver.run("RTC", "MEDIUM").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        assert_eq!(device.push_count(), 0);
        assert!(device.commands().is_empty());
        assert!(device.pulls().is_empty());
        assert!(!dir.path().join("logs").exists());
    }

    #[tokio::test]
    async fn test_unresolvable_work_dir_is_config_error() {
        let device = MockDevice::new();
        let config = Config {
            output_root: std::path::PathBuf::new(),
            ..Config::default()
        };
        let driver = BenchmarkDriver::new(config, Arc::new(device.clone()));
        assert!(matches!(driver.run("RTC", "NONE").await, Err(AppError::Config(_))));
        assert!(device.commands().is_empty());
    }

    #[tokio::test]
    async fn test_failed_measurement_skips_pull() {
        let device = MockDevice::new();
        device.fail_commands(true);
        let (driver, dir) = driver(&device);

        let report = driver.run("RTC", "NONE").await.unwrap();
        assert_eq!(report.iterations, 100);
        assert_eq!(report.failed_measurements, 100);
        assert_eq!(report.failed_pulls, 100);
        assert_eq!(report.collected_logs(), 0);
        assert!(device.pulls().is_empty());
        assert!(!dir.path().join("logs/RTC/NONE/raw_times/timestamps_0.txt").exists());
    }

    #[tokio::test]
    async fn test_failed_pulls_are_counted() {
        let device = MockDevice::new();
        device.fail_pulls(true);
        let (driver, _dir) = driver(&device);

        let report = driver.run("TIME", "NONE").await.unwrap();
        assert_eq!(report.failed_measurements, 0);
        assert_eq!(report.failed_pulls, 100);
        assert!(!report.is_clean());
    }
}
