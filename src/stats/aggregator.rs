//! Pass 2: per-iteration data files to running aggregate statistics

use super::indexed_files;
use crate::error::{AppError, Result};
use crate::models::SampleStats;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends one mean and one variance per data file
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsAggregator;

impl StatsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Reduce every `data_<i>.txt` in `data_dir`, in ascending index order
    pub fn reduce_dir(&self, data_dir: &Path) -> Result<Vec<(u64, SampleStats)>> {
        indexed_files(data_dir, "data_", ".txt")?
            .into_iter()
            .map(|(index, path)| {
                let values = read_values(&path)?;
                let stats = SampleStats::from_values(&values)
                    .map_err(|_| AppError::parse(format!("Data file {} is empty", path.display())))?;
                Ok((index, stats))
            })
            .collect()
    }

    /// Reduce `data_dir` and append the results under `stats_dir`.
    ///
    /// Nothing is appended unless every file reduces cleanly.
    pub fn aggregate(&self, data_dir: &Path, stats_dir: &Path) -> Result<Vec<SampleStats>> {
        let stats: Vec<SampleStats> = self.reduce_dir(data_dir)?.into_iter().map(|(_, s)| s).collect();

        std::fs::create_dir_all(stats_dir).map_err(|e| {
            AppError::io(format!("Failed to create stats directory {}: {}", stats_dir.display(), e))
        })?;

        append_lines(&stats_dir.join("averages.txt"), stats.iter().map(|s| s.mean))?;
        append_lines(&stats_dir.join("variances.txt"), stats.iter().map(|s| s.variance))?;
        Ok(stats)
    }
}

/// Read one float per line; a blank line is a parse error.
pub fn read_values(path: &Path) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read {}: {}", path.display(), e)))?;

    content
        .lines()
        .enumerate()
        .map(|(n, line)| {
            let line = line.trim();
            line.parse::<f64>().map_err(|e| {
                AppError::parse(format!("{}:{}: invalid value \"{}\": {}", path.display(), n + 1, line, e))
            })
        })
        .collect()
}

fn append_lines(path: &Path, values: impl Iterator<Item = f64>) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::io(format!("Failed to open {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    for value in values {
        writeln!(writer, "{}", value)?;
    }
    writer.flush()?;
    Ok(())
}
