//! Data models and structures for the guest clock benchmark

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{BenchmarkReport, LatencySample, SampleStats};
