//! Latency sample and benchmark result data models

use crate::types::{AppError, ClockType, ContentionLevel, ParseMethod, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latency values derived from one raw timestamp log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    /// Iteration index shared with the source `timestamps_<i>.txt`
    pub index: u64,
    /// Policy the values were derived with
    pub method: ParseMethod,
    /// Derived values in output order
    pub values: Vec<f64>,
}

impl LatencySample {
    pub fn new(index: u64, method: ParseMethod, values: Vec<f64>) -> Self {
        Self { index, method, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Mean and population variance of one latency data file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub count: usize,
    pub mean: f64,
    /// `Σ(mean - x)² / n`
    pub variance: f64,
}

impl SampleStats {
    /// Reduce a set of values; an empty set has no mean and is rejected.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(AppError::parse("Cannot compute statistics over an empty data set"));
        }

        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (mean - x).powi(2)).sum::<f64>() / n;

        Ok(Self { count, mean, variance })
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Outcome of one benchmark run for a (clock, level) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub clock: ClockType,
    pub level: ContentionLevel,
    /// Iterations whose contention cycle completed
    pub iterations: u32,
    /// Iterations whose guest measurement command reported failure
    pub failed_measurements: u32,
    /// Iterations whose log pull reported failure (or was skipped)
    pub failed_pulls: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BenchmarkReport {
    pub fn new(clock: ClockType, level: ContentionLevel) -> Self {
        Self {
            clock,
            level,
            iterations: 0,
            failed_measurements: 0,
            failed_pulls: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Raw logs actually collected
    pub fn collected_logs(&self) -> u32 {
        self.iterations.saturating_sub(self.failed_pulls)
    }

    pub fn is_clean(&self) -> bool {
        self.failed_measurements == 0 && self.failed_pulls == 0
    }

    pub fn mark_completed(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }
}
