//! Topic help with usage examples and the on-disk layout

use crate::config::env::EnvManager;
use colored::*;

/// Help text renderer for the CLI
#[derive(Debug, Default)]
pub struct HelpSystem;

impl HelpSystem {
    pub fn new() -> Self {
        Self
    }

    /// Main help: usage, examples, environment and layout
    pub fn display_main_help(&self, use_colors: bool) -> String {
        [
            self.format_header(use_colors),
            self.format_examples_section(use_colors),
            self.format_environment_help(use_colors),
            self.format_layout_help(use_colors),
        ]
        .join("\n")
    }

    pub fn display_topic_help(&self, topic: &str, use_colors: bool) -> Option<String> {
        match topic.to_lowercase().as_str() {
            "env" | "environment" | "config" => Some(self.format_environment_help(use_colors)),
            "layout" | "output" => Some(self.format_layout_help(use_colors)),
            "examples" => Some(self.format_examples_section(use_colors)),
            _ => None,
        }
    }

    fn heading(&self, text: &str, use_colors: bool) -> String {
        if use_colors {
            format!("{}\n", text.bold().underline())
        } else {
            format!("{}\n{}\n", text, "=".repeat(text.len()))
        }
    }

    fn format_header(&self, use_colors: bool) -> String {
        let title = format!("Guest Clock Bench {}", env!("CARGO_PKG_VERSION"));
        let mut out = self.heading(&title, use_colors);
        out.push_str("Measures guest clock jitter while the host floods the device with adb pushes.\n\n");
        out.push_str("Usage: gcb [OPTIONS] <CLOCK_TYPE>\n");
        out.push_str("  CLOCK_TYPE   TIME, KVM (reduced by DIFFS) or RTC (reduced by RUNS)\n");
        out
    }

    fn format_examples_section(&self, use_colors: bool) -> String {
        let mut out = self.heading("Examples", use_colors);
        let examples = [
            ("gcb KVM", "install, benchmark NONE then HIGH, and reduce the logs"),
            ("gcb RTC --level HIGH --skip-install", "rerun only the HIGH level"),
            ("gcb TIME --parse-only", "reduce logs already on disk"),
            ("gcb TIME --serial emulator-5554", "target one device"),
            ("gcb --init-env", "write .env.example"),
        ];
        for (command, description) in examples {
            let command = if use_colors { command.green().to_string() } else { command.to_string() };
            out.push_str(&format!("  {:<40} {}\n", command, description));
        }
        out
    }

    fn format_environment_help(&self, use_colors: bool) -> String {
        let mut out = self.heading("Environment", use_colors);
        out.push_str(&EnvManager::display_env_help());
        out
    }

    fn format_layout_help(&self, use_colors: bool) -> String {
        let mut out = self.heading("Output layout", use_colors);
        out.push_str("  <output-root>/logs/<CLOCK>/<LEVEL>/\n");
        out.push_str("    raw_times/timestamps_<i>.txt   pulled guest logs, one per iteration\n");
        out.push_str("    data/data_<i>.txt              derived latency values\n");
        out.push_str("    stats/averages.txt             one mean per data file, appended\n");
        out.push_str("    stats/variances.txt            one population variance per data file, appended\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        let help = HelpSystem::new();
        assert!(help.display_topic_help("ENV", false).unwrap().contains("ADB_PATH"));
        assert!(help.display_topic_help("examples", false).unwrap().contains("--parse-only"));
        assert!(help.display_topic_help("dns", false).is_none());
    }

    #[test]
    fn test_main_help_without_color() {
        let text = HelpSystem::new().display_main_help(false);
        assert!(text.contains("Usage: gcb"));
        assert!(text.contains("stats/averages.txt"));
        assert!(!text.contains("\x1b["));
    }
}
