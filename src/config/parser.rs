//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::config::parse_levels, models::Config};

/// Configuration parser that layers defaults, `.env`, the environment and
/// CLI arguments, in that order
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(root) = &self.cli.output_root {
            config.output_root = root.clone();
        }

        if let Some(adb) = &self.cli.adb_path {
            config.adb_path = adb.clone();
        }

        if let Some(serial) = &self.cli.serial {
            config.device_serial = Some(serial.trim().to_string());
        }

        if !self.cli.levels.is_empty() {
            let mut levels = Vec::new();
            for value in &self.cli.levels {
                levels.extend(parse_levels(value)?);
            }
            config.contention_levels = levels;
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only switches
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
            println!("{}", display_config_summary(config));
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let levels: Vec<&str> = config.contention_levels.iter().map(|l| l.as_str()).collect();
    let summary = [
        format!("Output Root: {}", config.output_root.display()),
        format!("adb: {}", config.adb_path),
        format!("Device Serial: {}", config.device_serial.as_deref().unwrap_or("(default)")),
        format!("Guest Work Dir: {}", config.guest_work_dir),
        format!("Contention Dir: {}", config.contention_dir.display()),
        format!("Timing Program: {} via {}", config.timing_source.display(), config.timing_compiler),
        format!("Contention Levels: {}", levels.join(", ")),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];
    summary.join("\n")
}
