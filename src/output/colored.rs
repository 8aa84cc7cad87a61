//! Colored formatter with terminal color support

use super::formatter::{summary_row, FormattingOptions, OutputFormatter, PlainFormatter, RowData, SUMMARY_COLUMNS};
use super::RunSummary;
use crate::error::Result;
use colored::*;

/// How much a run's per-file means spread, relative to their magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JitterLevel {
    Stable,
    Moderate,
    Unstable,
}

impl JitterLevel {
    /// Classify by the coefficient of variation of per-file means
    pub fn from_run(run: &RunSummary) -> Option<Self> {
        let means: Vec<f64> = run.parse.stats.iter().map(|s| s.mean).collect();
        if means.len() < 2 {
            return None;
        }
        let n = means.len() as f64;
        let center = means.iter().sum::<f64>() / n;
        if center == 0.0 {
            return None;
        }
        let spread = (means.iter().map(|m| (m - center).powi(2)).sum::<f64>() / n).sqrt();
        let cv = spread / center.abs();

        Some(if cv < 0.05 {
            Self::Stable
        } else if cv < 0.25 {
            Self::Moderate
        } else {
            Self::Unstable
        })
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Stable => Color::Green,
            Self::Moderate => Color::Yellow,
            Self::Unstable => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Moderate => "moderate jitter",
            Self::Unstable => "unstable",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter built on the plain table layout
pub struct ColoredFormatter {
    plain: PlainFormatter,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            plain: PlainFormatter::new(options),
            color_scheme: ColorScheme::default(),
        }
    }

    pub fn with_color_scheme(mut self, color_scheme: ColorScheme) -> Self {
        self.color_scheme = color_scheme;
        self
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        Ok(format!(
            "{}\n{}",
            title.color(self.color_scheme.header).bold(),
            "=".repeat(title.len()).color(self.color_scheme.muted)
        ))
    }

    fn format_run_summary(&self, run: &RunSummary) -> Result<String> {
        let plain = self.plain.format_run_summary(run)?;
        let mut lines = plain.lines();
        let mut out = String::new();

        if let Some(first) = lines.next() {
            out.push_str(&first.bold().to_string());
            if let Some(jitter) = JitterLevel::from_run(run) {
                out.push_str(&format!(" [{}]", jitter.description().color(jitter.color())));
            }
            out.push('\n');
        }

        let clean = run.report.as_ref().map(|r| r.is_clean()).unwrap_or(true);
        for line in lines {
            let line = if (line.contains("Failed") && !clean) || line.contains("Negative differences") {
                line.color(self.color_scheme.warning).to_string()
            } else {
                line.to_string()
            };
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    fn format_summary_table(&self, runs: &[RunSummary]) -> Result<String> {
        let rows: Vec<RowData> = runs.iter().map(summary_row).collect();
        let table = self.plain.create_table(&SUMMARY_COLUMNS, &rows);
        let mut lines = table.lines();
        let mut out = String::new();

        if let Some(header) = lines.next() {
            out.push_str(&header.color(self.color_scheme.header).bold().to_string());
            out.push('\n');
        }
        if let Some(rule) = lines.next() {
            out.push_str(&rule.color(self.color_scheme.muted).to_string());
            out.push('\n');
        }
        for (line, run) in lines.zip(runs) {
            let clean = run.report.as_ref().map(|r| r.is_clean()).unwrap_or(true);
            let color = if clean { self.color_scheme.success } else { self.color_scheme.warning };
            out.push_str(&line.color(color).to_string());
            out.push('\n');
        }
        Ok(out)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", "ERROR:".color(self.color_scheme.error).bold(), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", "WARNING:".color(self.color_scheme.warning).bold(), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", "OK:".color(self.color_scheme.success).bold(), message))
    }
}
