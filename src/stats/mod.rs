//! Two-pass reduction of raw timestamp logs
//!
//! Pass 1 ([`LatencyExtractor`]) turns every `raw_times/timestamps_<i>.txt`
//! into `data/data_<i>.txt`. Pass 2 ([`StatsAggregator`]) reduces every data
//! file to a mean and population variance and appends them to
//! `stats/averages.txt` and `stats/variances.txt`.

pub mod aggregator;
pub mod extractor;


pub use aggregator::StatsAggregator;
pub use extractor::LatencyExtractor;

use crate::error::{AppError, Result};
use crate::models::SampleStats;
use crate::types::ParseMethod;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory layout of one `logs/<clock>/<level>` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_times(&self) -> PathBuf {
        self.root.join("raw_times")
    }

    pub fn data(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn stats(&self) -> PathBuf {
        self.root.join("stats")
    }

    /// Where the driver stores the log pulled for iteration `index`
    pub fn raw_log(&self, index: u64) -> PathBuf {
        self.raw_times().join(format!("timestamps_{}.txt", index))
    }

    pub fn data_file(&self, index: u64) -> PathBuf {
        self.data().join(format!("data_{}.txt", index))
    }

    pub fn averages(&self) -> PathBuf {
        self.stats().join("averages.txt")
    }

    pub fn variances(&self) -> PathBuf {
        self.stats().join("variances.txt")
    }
}

/// Result of one parse invocation over a run directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseSummary {
    pub method: ParseMethod,
    /// Data files written by pass 1
    pub extracted: usize,
    /// Negative DIFFS values passed through unflagged
    pub negative_diffs: usize,
    /// Per-file reductions appended by pass 2, in processing order
    pub stats: Vec<SampleStats>,
}

impl ParseSummary {
    /// Mean of the per-file means, if any file was reduced
    pub fn mean_of_means(&self) -> Option<f64> {
        if self.stats.is_empty() {
            return None;
        }
        Some(self.stats.iter().map(|s| s.mean).sum::<f64>() / self.stats.len() as f64)
    }

    /// Mean of the per-file variances, if any file was reduced
    pub fn mean_variance(&self) -> Option<f64> {
        if self.stats.is_empty() {
            return None;
        }
        Some(self.stats.iter().map(|s| s.variance).sum::<f64>() / self.stats.len() as f64)
    }
}

/// Derive latency values from raw timestamps.
///
/// DIFFS yields `n - 1` consecutive differences in input order. RUNS counts
/// reads per distinct timestamp, drops the largest timestamp as an
/// incomplete tick, and yields `1 / count` per remaining timestamp in
/// ascending timestamp order.
pub fn compute_latency(timestamps: &[i64], method: ParseMethod) -> Vec<f64> {
    match method {
        ParseMethod::Diffs => diffs(timestamps),
        ParseMethod::Runs => runs(timestamps),
    }
}

fn diffs(timestamps: &[i64]) -> Vec<f64> {
    timestamps
        .windows(2)
        .map(|pair| (i128::from(pair[1]) - i128::from(pair[0])) as f64)
        .collect()
}

fn runs(timestamps: &[i64]) -> Vec<f64> {
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for &ts in timestamps {
        *counts.entry(ts).or_insert(0) += 1;
    }
    counts.pop_last();
    counts.values().map(|&count| 1.0 / count as f64).collect()
}

/// Run both passes over `run_dir` with a method given by name.
///
/// The method name is checked before anything is read or written.
pub fn parse(method: &str, run_dir: &Path) -> Result<ParseSummary> {
    let method: ParseMethod = method.parse()?;
    parse_run(method, &RunLayout::new(run_dir))
}

/// Run both passes over a run layout
pub fn parse_run(method: ParseMethod, layout: &RunLayout) -> Result<ParseSummary> {
    let extractor = LatencyExtractor::new(method);
    let samples = extractor.extract_dir(&layout.raw_times(), &layout.data())?;
    let negative_diffs = match method {
        ParseMethod::Diffs => samples
            .iter()
            .map(|s| s.values.iter().filter(|v| **v < 0.0).count())
            .sum(),
        ParseMethod::Runs => 0,
    };

    let stats = StatsAggregator::new().aggregate(&layout.data(), &layout.stats())?;

    Ok(ParseSummary {
        method,
        extracted: samples.len(),
        negative_diffs,
        stats,
    })
}

/// Files in `dir` named `<prefix><index><suffix>`, sorted by index.
///
/// Other entries are ignored. A matching name whose index does not fit in
/// a `u64` is a parse error.
pub(crate) fn indexed_files(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<(u64, PathBuf)>> {
    let pattern = format!("^{}(\\d+){}$", regex::escape(prefix), regex::escape(suffix));
    let re = Regex::new(&pattern)
        .map_err(|e| AppError::internal(format!("Invalid file pattern {}: {}", pattern, e)))?;

    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::io(format!("Failed to read directory {}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(digits) = re.captures(name).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let index = digits.as_str().parse::<u64>().map_err(|e| {
            AppError::parse(format!("Index of {} is out of range: {}", entry.path().display(), e))
        })?;
        files.push((index, entry.path()));
    }

    files.sort_by_key(|(index, _)| *index);
    Ok(files)
}
