//! Pass 1: raw timestamp logs to latency data files

use super::{compute_latency, indexed_files};
use crate::error::{AppError, Result};
use crate::models::LatencySample;
use crate::types::ParseMethod;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Converts `timestamps_<i>.txt` logs into `data_<i>.txt` sample files
#[derive(Debug, Clone, Copy)]
pub struct LatencyExtractor {
    method: ParseMethod,
}

impl LatencyExtractor {
    pub fn new(method: ParseMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> ParseMethod {
        self.method
    }

    /// Derive the latency sample for one raw log
    pub fn extract_file(&self, path: &Path, index: u64) -> Result<LatencySample> {
        let timestamps = read_timestamps(path)?;
        Ok(LatencySample::new(index, self.method, compute_latency(&timestamps, self.method)))
    }

    /// Extract every raw log in `raw_dir` into `data_dir`.
    ///
    /// Logs are handled in ascending iteration order. Existing data files
    /// for the same index are overwritten.
    pub fn extract_dir(&self, raw_dir: &Path, data_dir: &Path) -> Result<Vec<LatencySample>> {
        let logs = indexed_files(raw_dir, "timestamps_", ".txt")?;

        std::fs::create_dir_all(data_dir).map_err(|e| {
            AppError::io(format!("Failed to create data directory {}: {}", data_dir.display(), e))
        })?;

        let mut samples = Vec::with_capacity(logs.len());
        for (index, path) in logs {
            let sample = self.extract_file(&path, index)?;
            write_sample(&data_dir.join(format!("data_{}.txt", index)), &sample)?;
            samples.push(sample);
        }
        Ok(samples)
    }
}

/// Read one integer timestamp per line.
///
/// Every line must hold a timestamp; a blank line is a parse error.
pub fn read_timestamps(path: &Path) -> Result<Vec<i64>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read {}: {}", path.display(), e)))?;

    content
        .lines()
        .enumerate()
        .map(|(n, line)| (n, line.trim()))
        .map(|(n, line)| {
            line.parse::<i64>().map_err(|e| {
                AppError::parse(format!("{}:{}: invalid timestamp \"{}\": {}", path.display(), n + 1, line, e))
            })
        })
        .collect()
}

/// Write a sample one value per line
pub fn write_sample(path: &Path, sample: &LatencySample) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    for value in &sample.values {
        writeln!(writer, "{}", value)?;
    }
    writer.flush()?;
    Ok(())
}
