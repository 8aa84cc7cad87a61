//! End-to-end benchmark pipeline tests against a mock device

use guest_clock_bench::{
    device::MockDevice,
    error::AppError,
    executor::BenchmarkDriver,
    models::Config,
    stats::{self, RunLayout},
    types::{ClockType, ContentionLevel, ParseMethod},
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn setup(device: &MockDevice) -> (BenchmarkDriver, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = Config {
        output_root: dir.path().to_path_buf(),
        contention_dir: dir.path().join("contention"),
        ..Config::default()
    };
    (BenchmarkDriver::new(config, Arc::new(device.clone())), dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_benchmark_then_parse() {
    let device = MockDevice::new();
    device.set_log_content("100\n103\n104\n110\n");
    let (driver, dir) = setup(&device);
    device.observe_workers(driver.worker_gauge());

    let report = driver.run_level(ClockType::Kvm, ContentionLevel::High).await.unwrap();
    assert_eq!(report.iterations, 100);
    assert_eq!(report.collected_logs(), 100);
    assert!(device.observed_workers().iter().all(|n| *n == 36));

    let summary = stats::parse("DIFFS", &dir.path().join("logs/KVM/HIGH")).unwrap();
    assert_eq!(summary.method, ParseMethod::Diffs);
    assert_eq!(summary.extracted, 100);
    assert_eq!(summary.stats.len(), 100);
    for s in &summary.stats {
        assert_eq!(s.count, 3);
        assert!((s.mean - 10.0 / 3.0).abs() < 1e-12);
    }

    let layout = RunLayout::new(dir.path().join("logs/KVM/HIGH"));
    assert_eq!(fs::read_to_string(layout.data_file(42)).unwrap(), "3\n1\n6\n");
    assert_eq!(fs::read_to_string(layout.averages()).unwrap().lines().count(), 100);
    assert_eq!(fs::read_to_string(layout.variances()).unwrap().lines().count(), 100);
}

#[tokio::test]
async fn test_no_contention_runs_measurement_only() {
    let device = MockDevice::new();
    let (driver, _dir) = setup(&device);
    device.observe_workers(driver.worker_gauge());

    let report = driver.run("RTC", "NONE").await.unwrap();
    assert!(report.is_clean());
    assert_eq!(device.push_count(), 0);
    assert!(device.observed_workers().iter().all(|n| *n == 0));
    assert_eq!(device.commands().len(), 100);
}

#[tokio::test]
async fn test_failed_pulls_leave_gaps() {
    let device = MockDevice::new();
    device.fail_pulls(true);
    let (driver, dir) = setup(&device);

    let report = driver.run("TIME", "NONE").await.unwrap();
    assert_eq!(report.iterations, 100);
    assert_eq!(report.failed_pulls, 100);
    assert!(!report.is_clean());

    let summary = stats::parse("DIFFS", &dir.path().join("logs/TIME/NONE")).unwrap();
    assert_eq!(summary.extracted, 0);
    assert!(summary.stats.is_empty());
}

#[tokio::test]
async fn test_invalid_inputs_have_no_side_effects() {
    let device = MockDevice::new();
    let (driver, dir) = setup(&device);

    assert!(matches!(driver.run("FOO", "NONE").await, Err(AppError::Config(_))));
    assert!(matches!(driver.run("KVM", "MEDIUM").await, Err(AppError::Config(_))));
    assert!(device.commands().is_empty());
    assert!(!dir.path().join("logs").exists());

    assert!(matches!(
        stats::parse("SPLINES", &dir.path().join("logs/KVM/NONE")),
        Err(AppError::Parse(_))
    ));
    assert!(!dir.path().join("logs").exists());
}
