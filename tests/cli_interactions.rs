//! CLI options interaction tests
//!
//! These run the real binary in parse-only and utility modes, so no device
//! is needed.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper function to create a test command with a clean environment
fn create_test_cmd() -> Command {
    let mut cmd = Command::cargo_bin("gcb").unwrap();
    for var in [
        "GCB_OUTPUT_ROOT",
        "ADB_PATH",
        "ANDROID_SERIAL",
        "GUEST_WORK_DIR",
        "CONTENTION_DIR",
        "TIMING_SOURCE",
        "TIMING_COMPILER",
        "CONTENTION_LEVELS",
        "ENABLE_COLOR",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Write raw timestamp logs for one run directory
fn write_raw_logs(root: &Path, clock: &str, level: &str, logs: &[&str]) {
    let raw = root.join("logs").join(clock).join(level).join("raw_times");
    fs::create_dir_all(&raw).unwrap();
    for (i, body) in logs.iter().enumerate() {
        fs::write(raw.join(format!("timestamps_{}.txt", i)), body).unwrap();
    }
}

#[test]
fn test_unknown_clock_type_exits_with_config_code() {
    let temp_dir = TempDir::new().unwrap();

    create_test_cmd()
        .arg("FOO")
        .arg("--parse-only")
        .arg("--no-color")
        .arg("-o")
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FOO"));

    assert!(!temp_dir.path().join("logs").exists());
}

#[test]
fn test_missing_clock_type_is_rejected() {
    create_test_cmd()
        .arg("--parse-only")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("CLOCK_TYPE"));
}

#[test]
fn test_unknown_level_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    create_test_cmd()
        .args(["KVM", "--parse-only", "--no-color", "-l", "MEDIUM", "-o"])
        .arg(temp_dir.path())
        .assert()
        .code(1);

    assert!(!temp_dir.path().join("logs").exists());
}

#[test]
fn test_parse_only_writes_stats() {
    let temp_dir = TempDir::new().unwrap();
    write_raw_logs(temp_dir.path(), "KVM", "NONE", &["10\n12\n15\n", "100\n101\n103\n106\n"]);

    create_test_cmd()
        .args(["kvm", "--parse-only", "--no-color", "-l", "NONE", "-o"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Guest Clock Stability Results"))
        .stdout(predicate::str::contains("KVM"));

    let run = temp_dir.path().join("logs/KVM/NONE");
    assert_eq!(fs::read_to_string(run.join("data/data_0.txt")).unwrap(), "2\n3\n");
    assert_eq!(fs::read_to_string(run.join("data/data_1.txt")).unwrap(), "1\n2\n3\n");

    let averages = fs::read_to_string(run.join("stats/averages.txt")).unwrap();
    let averages: Vec<f64> = averages.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(averages, vec![2.5, 2.0]);

    let variances = fs::read_to_string(run.join("stats/variances.txt")).unwrap();
    assert_eq!(variances.lines().count(), 2);
}

#[test]
fn test_parse_only_appends_on_rerun() {
    let temp_dir = TempDir::new().unwrap();
    write_raw_logs(temp_dir.path(), "RTC", "NONE", &["1\n1\n2\n2\n3\n"]);

    for _ in 0..2 {
        create_test_cmd()
            .args(["RTC", "--parse-only", "--no-color", "-l", "NONE", "-o"])
            .arg(temp_dir.path())
            .assert()
            .success();
    }

    let averages = fs::read_to_string(temp_dir.path().join("logs/RTC/NONE/stats/averages.txt")).unwrap();
    assert_eq!(averages.lines().count(), 2);
}

#[test]
fn test_parse_only_without_logs_fails() {
    let temp_dir = TempDir::new().unwrap();

    create_test_cmd()
        .args(["TIME", "--parse-only", "--no-color", "-l", "NONE", "-o"])
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_parse_only_conflicts_with_skip_install() {
    create_test_cmd()
        .args(["KVM", "--parse-only", "--skip-install"])
        .assert()
        .code(1);
}

#[test]
fn test_init_env_creates_example() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bench.env");

    create_test_cmd()
        .arg("--init-env")
        .arg(&path)
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("CONTENTION_LEVELS"));
    assert!(content.contains("GUEST_WORK_DIR"));
}

#[test]
fn test_help_topics() {
    create_test_cmd()
        .args(["--help-topic", "layout", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stats/averages.txt"));

    create_test_cmd()
        .args(["--help-topic", "env", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ANDROID_SERIAL"));

    create_test_cmd()
        .args(["--help-topic", "nonsense", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown help topic"));
}
