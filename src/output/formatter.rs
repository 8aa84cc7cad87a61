//! Core formatting traits and the plain text implementation

use super::RunSummary;
use crate::error::Result;
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    fn format_header(&self, title: &str) -> Result<String>;

    /// One (clock, level) run: loop counters and reduction results
    fn format_run_summary(&self, run: &RunSummary) -> Result<String>;

    /// Side-by-side comparison of every run
    fn format_summary_table(&self, runs: &[RunSummary]) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Also list per-file means
    pub verbose_mode: bool,
    pub table_borders: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: &'static str,
    pub alignment: Alignment,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

pub(crate) const SUMMARY_COLUMNS: [Column; 6] = [
    Column { header: "Clock", alignment: Alignment::Left },
    Column { header: "Level", alignment: Alignment::Left },
    Column { header: "Logs", alignment: Alignment::Right },
    Column { header: "Files", alignment: Alignment::Right },
    Column { header: "Mean", alignment: Alignment::Right },
    Column { header: "Variance", alignment: Alignment::Right },
];

/// Cells of one summary table row
pub(crate) fn summary_row(run: &RunSummary) -> RowData {
    let logs = match &run.report {
        Some(report) => format!("{}/{}", report.collected_logs(), report.iterations),
        None => "-".to_string(),
    };
    vec![
        run.clock.to_string(),
        run.level.to_string(),
        logs,
        run.parse.stats.len().to_string(),
        run.parse.mean_of_means().map(format_value).unwrap_or_else(|| "-".to_string()),
        run.parse.mean_variance().map(format_value).unwrap_or_else(|| "-".to_string()),
    ]
}

/// Values span microseconds to whole ticks, so keep six significant digits
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 1e6 || value.abs() < 1e-3 {
        format!("{:.5e}", value)
    } else {
        let digits = 5 - value.abs().log10().floor() as i32;
        format!("{:.*}", digits.clamp(0, 8) as usize, value)
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Render rows under the given columns
    pub fn create_table(&self, columns: &[Column], rows: &[RowData]) -> String {
        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                rows.iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(col.header.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let render = |cells: &[String]| -> String {
            let parts: Vec<String> = columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (col, width))| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    match col.alignment {
                        Alignment::Left => format!("{:<width$}", cell, width = width),
                        Alignment::Right => format!("{:>width$}", cell, width = width),
                    }
                })
                .collect();
            if self.options.table_borders {
                format!("| {} |", parts.join(" | "))
            } else {
                parts.join("  ")
            }
        };

        let mut table = String::new();
        let header: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
        let header_line = render(&header);
        let rule = if self.options.table_borders {
            let inner: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            format!("|-{}-|", inner.join("-|-"))
        } else {
            "-".repeat(header_line.len())
        };

        let _ = writeln!(table, "{}", header_line);
        let _ = writeln!(table, "{}", rule);
        for row in rows {
            let _ = writeln!(table, "{}", render(row));
        }
        table
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        Ok(format!("{}\n{}", title, "=".repeat(title.len())))
    }

    fn format_run_summary(&self, run: &RunSummary) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "{} / {} ({})", run.clock, run.level, run.parse.method)?;

        if let Some(report) = &run.report {
            writeln!(
                out,
                "  Iterations: {}  Logs collected: {}  Failed measurements: {}  Failed pulls: {}",
                report.iterations,
                report.collected_logs(),
                report.failed_measurements,
                report.failed_pulls
            )?;
            if let Some(duration) = report.duration() {
                writeln!(out, "  Duration: {:.1}s", duration.num_milliseconds() as f64 / 1000.0)?;
            }
        }

        writeln!(out, "  Data files: {}", run.parse.stats.len())?;
        if let (Some(mean), Some(variance)) = (run.parse.mean_of_means(), run.parse.mean_variance()) {
            writeln!(out, "  Mean of means: {}  Mean variance: {}", format_value(mean), format_value(variance))?;
        }
        if run.parse.negative_diffs > 0 {
            writeln!(out, "  Negative differences: {}", run.parse.negative_diffs)?;
        }

        if self.options.verbose_mode {
            for (i, stats) in run.parse.stats.iter().enumerate() {
                writeln!(
                    out,
                    "    #{:<3} n={:<6} mean={:<12} variance={}",
                    i,
                    stats.count,
                    format_value(stats.mean),
                    format_value(stats.variance)
                )?;
            }
        }

        Ok(out)
    }

    fn format_summary_table(&self, runs: &[RunSummary]) -> Result<String> {
        let rows: Vec<RowData> = runs.iter().map(summary_row).collect();
        Ok(self.create_table(&SUMMARY_COLUMNS, &rows))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("OK: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_run;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(2.5), "2.50000");
        assert_eq!(format_value(1234.5), "1234.50");
        assert_eq!(format_value(0.5), "0.500000");
        assert_eq!(format_value(1.0e-5), "1.00000e-5");
    }

    #[test]
    fn test_table_alignment() {
        let formatter = PlainFormatter::new(FormattingOptions::default());
        let table = formatter.format_summary_table(&[sample_run()]).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| Clock | Level |"));
        assert!(lines[2].contains("| KVM   | HIGH  |"));
        assert!(lines[2].contains("97/100"));
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn test_run_summary_lists_failures() {
        let formatter = PlainFormatter::new(FormattingOptions { verbose_mode: true, ..Default::default() });
        let text = formatter.format_run_summary(&sample_run()).unwrap();
        assert!(text.starts_with("KVM / HIGH (DIFFS)"));
        assert!(text.contains("Failed pulls: 3"));
        assert!(text.contains("Data files: 2"));
        assert!(text.contains("#1"));
    }
}
