//! Output formatting and display system
//!
//! Renders benchmark and parse results as plain or colored text, with a
//! per-run section and a comparison table across runs.

mod colored;
mod formatter;

pub use self::colored::{ColorScheme, ColoredFormatter, JitterLevel};
pub use self::formatter::{format_value, Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData};

use crate::{
    error::Result,
    models::BenchmarkReport,
    stats::ParseSummary,
    types::{ClockType, ContentionLevel},
};
use serde::{Deserialize, Serialize};

/// Everything known about one (clock, level) run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub clock: ClockType,
    pub level: ContentionLevel,
    /// Absent when only existing logs were reduced
    pub report: Option<BenchmarkReport>,
    pub parse: ParseSummary,
}

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            table_borders: true,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, true)
    }
}

/// Main output coordinator that handles all result display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    /// Render a single run as soon as it finishes
    pub fn display_run(&self, run: &RunSummary) -> Result<String> {
        self.formatter.format_run_summary(run)
    }

    /// Render the final report for every run
    pub fn display_results(&self, runs: &[RunSummary]) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.formatter.format_header("Guest Clock Stability Results")?);
        output.push_str("\n\n");
        output.push_str(&self.formatter.format_summary_table(runs)?);

        let dirty: Vec<String> = runs
            .iter()
            .filter_map(|run| {
                let report = run.report.as_ref()?;
                (!report.is_clean()).then(|| {
                    format!(
                        "{}/{}: {} of {} logs missing",
                        run.clock,
                        run.level,
                        report.failed_pulls,
                        report.iterations
                    )
                })
            })
            .collect();

        output.push('\n');
        if dirty.is_empty() {
            output.push_str(&self.formatter.format_success("every iteration collected its log")?);
        } else {
            for line in dirty {
                output.push_str(&self.formatter.format_warning(&line)?);
                output.push('\n');
            }
        }
        Ok(output)
    }

    pub fn display_error(&self, error: &str) -> Result<String> {
        self.formatter.format_error(error)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::SampleStats;
    use crate::types::ParseMethod;

    pub(crate) fn sample_run() -> RunSummary {
        let mut report = BenchmarkReport::new(ClockType::Kvm, ContentionLevel::High);
        report.iterations = 100;
        report.failed_pulls = 3;
        report.mark_completed();

        RunSummary {
            clock: ClockType::Kvm,
            level: ContentionLevel::High,
            report: Some(report),
            parse: ParseSummary {
                method: ParseMethod::Diffs,
                extracted: 2,
                negative_diffs: 0,
                stats: vec![
                    SampleStats { count: 3, mean: 2.0, variance: 0.5 },
                    SampleStats { count: 3, mean: 3.0, variance: 1.5 },
                ],
            },
        }
    }

    #[test]
    fn test_display_results_flags_missing_logs() {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_plain_formatter());
        let text = coordinator.display_results(&[sample_run()]).unwrap();
        assert!(text.starts_with("Guest Clock Stability Results"));
        assert!(text.contains("WARNING: KVM/HIGH: 3 of 100 logs missing"));
    }

    #[test]
    fn test_display_results_parse_only() {
        let mut run = sample_run();
        run.report = None;
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_formatter(false, false));
        let text = coordinator.display_results(&[run]).unwrap();
        assert!(text.contains("OK: every iteration collected its log"));
        assert!(text.contains("|    - |"));
    }
}
