//! Command-line interface

pub mod help;

pub use help::HelpSystem;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Guest Clock Bench - measure guest clock stability under host I/O contention
#[derive(Parser, Debug, Clone)]
#[command(name = "gcb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Clock the timing program reads (TIME, RTC or KVM)
    #[arg(value_name = "CLOCK_TYPE")]
    pub clock_type: Option<String>,

    /// Contention level to run (NONE or HIGH); repeat for several
    #[arg(short, long = "level", value_name = "LEVEL", action = ArgAction::Append)]
    pub levels: Vec<String>,

    /// Reduce logs already on disk without touching the device
    #[arg(long)]
    pub parse_only: bool,

    /// Do not compile and push the timing program
    #[arg(long)]
    pub skip_install: bool,

    /// Directory the logs/ tree is written under
    #[arg(short, long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// adb executable
    #[arg(long = "adb", value_name = "PATH")]
    pub adb_path: Option<String>,

    /// Device serial passed to adb -s
    #[arg(short, long)]
    pub serial: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Write an example .env file to this path and exit
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = ".env.example")]
    pub init_env: Option<PathBuf>,

    /// Show help for a specific topic (env, layout, examples)
    #[arg(long, value_name = "TOPIC")]
    pub help_topic: Option<String>,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.is_utility_mode() {
            return Ok(());
        }

        if self.clock_type.is_none() {
            return Err("Must specify a CLOCK_TYPE (TIME, RTC or KVM)".to_string());
        }

        if self.parse_only && self.skip_install {
            return Err("--skip-install has no effect with --parse-only".to_string());
        }

        if let Some(serial) = &self.serial {
            if serial.trim().is_empty() {
                return Err("--serial cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// `--init-env` and `--help-topic` run without a clock type
    pub fn is_utility_mode(&self) -> bool {
        self.init_env.is_some() || self.help_topic.is_some()
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Display help for the specified topic or main help
    pub fn display_help(&self) -> String {
        let help_system = HelpSystem::new();
        let use_colors = self.use_colors();

        match &self.help_topic {
            Some(topic) => help_system.display_topic_help(topic, use_colors).unwrap_or_else(|| {
                format!(
                    "Unknown help topic: '{}'\n\nAvailable topics: env, layout, examples\n\n{}",
                    topic,
                    help_system.display_main_help(use_colors)
                )
            }),
            None => help_system.display_main_help(use_colors),
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Configuration Summary:\n");
        if let Some(clock) = &self.clock_type {
            summary.push_str(&format!("  Clock type: {}\n", clock));
        }
        if !self.levels.is_empty() {
            summary.push_str(&format!("  Levels: {}\n", self.levels.join(", ")));
        }
        summary.push_str(&format!("  Parse only: {}\n", self.parse_only));
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        if let Some(serial) = &self.serial {
            summary.push_str(&format!("  Device serial: {}\n", serial));
        }

        summary
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from(["gcb", "RTC"]);
        assert_eq!(cli.clock_type.as_deref(), Some("RTC"));
        assert!(cli.levels.is_empty());
        assert!(!cli.parse_only);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "gcb",
            "kvm",
            "--level",
            "NONE",
            "-l",
            "high",
            "--skip-install",
            "--output-root",
            "/tmp/out",
            "--adb",
            "/opt/adb",
            "--serial",
            "emulator-5554",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.levels, vec!["NONE", "high"]);
        assert!(cli.skip_install);
        assert_eq!(cli.output_root, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cli.adb_path.as_deref(), Some("/opt/adb"));
        assert_eq!(cli.serial.as_deref(), Some("emulator-5554"));
        assert!(cli.no_color);
        assert!(!cli.use_colors());
        assert!(cli.verbose && cli.debug);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_clock_type_required_outside_utility_mode() {
        let cli = Cli::parse_from(["gcb"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["gcb", "--init-env"]);
        assert_eq!(cli.init_env, Some(PathBuf::from(".env.example")));
        assert!(cli.validate().is_ok());

        let cli = Cli::parse_from(["gcb", "--init-env", "custom.env"]);
        assert_eq!(cli.init_env, Some(PathBuf::from("custom.env")));

        let cli = Cli::parse_from(["gcb", "--help-topic", "layout"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_conflicting_flags() {
        let cli = Cli::parse_from(["gcb", "TIME", "--parse-only", "--skip-install"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["gcb", "TIME", "--serial", " "]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_help_display() {
        let cli = Cli::parse_from(["gcb", "--help-topic", "layout", "--no-color"]);
        assert!(cli.display_help().contains("raw_times"));

        let cli = Cli::parse_from(["gcb", "--help-topic", "bogus", "--no-color"]);
        assert!(cli.display_help().contains("Unknown help topic: 'bogus'"));
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(["gcb", "TIME", "-l", "HIGH", "--serial", "abc"]);
        let summary = cli.get_config_summary();
        assert!(summary.contains("Clock type: TIME"));
        assert!(summary.contains("Levels: HIGH"));
        assert!(summary.contains("Device serial: abc"));
    }
}
