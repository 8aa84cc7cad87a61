//! Guest Clock Bench
//!
//! Measures how stable a guest operating system's clocks are while the host
//! floods the device with file transfers. A benchmark driver brackets each
//! timed measurement with a contention start/stop handshake, pulls the
//! guest's timestamp log, and a two-pass parser reduces the logs to latency
//! samples and running mean/variance files.

pub mod app;
pub mod cli;
pub mod config;
pub mod contention;
pub mod device;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use contention::{ContentionHandle, ContentionManager, ContentionWorkerPool};
pub use device::{AdbDevice, DeviceTransfer, MockDevice};
pub use error::{AppError, Result};
pub use executor::BenchmarkDriver;
pub use models::{BenchmarkReport, Config, LatencySample, SampleStats};
pub use output::{OutputCoordinator, OutputFormatter, OutputFormatterFactory, RunSummary};
pub use stats::{LatencyExtractor, ParseSummary, RunLayout, StatsAggregator};
pub use types::{ClockType, ContentionLevel, ParseMethod};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_OUTPUT_ROOT: &str = ".";
    pub const DEFAULT_ADB_PATH: &str = "adb";
    pub const DEFAULT_GUEST_WORK_DIR: &str = "/data/local/tmp";
    pub const DEFAULT_CONTENTION_DIR: &str = "contention";
    pub const DEFAULT_TIMING_SOURCE: &str = "timing.cpp";
    pub const DEFAULT_TIMING_COMPILER: &str = "lCXX";
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Log file the guest timing program writes, inside the guest work dir
    pub const GUEST_LOG_FILE: &str = "logs.txt";
    /// Installed name of the guest timing program
    pub const GUEST_EXEC_NAME: &str = "timing";

    /// Measurement iterations per (clock, level) pair
    pub const BENCHMARK_ITERATIONS: u32 = 100;
}
