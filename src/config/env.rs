//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::config::parse_levels;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)?;
        Ok(())
    }

    /// Load a specific env file if it exists. Variables already set in the
    /// process environment keep their values. Returns whether a file was read.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<bool> {
        if !path.exists() {
            if debug {
                println!("No {} file found, using defaults and CLI arguments", path.display());
            }
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        if debug {
            println!("Loaded configuration from {}", path.display());
        }
        Ok(true)
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Guest Clock Bench Configuration
#
# Values here are defaults for every run; command-line arguments override
# them and variables already exported in the shell take precedence.

# Directory the logs/<CLOCK>/<LEVEL> tree is written under
# GCB_OUTPUT_ROOT=.

# adb executable and, when several devices are attached, the target serial
# ADB_PATH=adb
# ANDROID_SERIAL=emulator-5554

# Guest directory holding the timing program, its log and pushed payloads
# GUEST_WORK_DIR=/data/local/tmp

# Host directory with small.txt, med.txt and large.txt (generated if missing)
# CONTENTION_DIR=contention

# Timing program source and the cross-compiler wrapper that builds it
# TIMING_SOURCE=timing.cpp
# TIMING_COMPILER=lCXX

# Contention levels to run, in order (NONE, HIGH)
# CONTENTION_LEVELS=NONE,HIGH

# Enable colored output (true/false)
# ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;
        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "GCB_OUTPUT_ROOT" | "ADB_PATH" | "CONTENTION_DIR" | "TIMING_SOURCE" | "TIMING_COMPILER" => {
                if value.trim().is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            "ANDROID_SERIAL" => {
                if value.chars().any(char::is_whitespace) {
                    return Err(AppError::config(format!("Invalid ANDROID_SERIAL value '{}'", value)));
                }
            }
            "GUEST_WORK_DIR" => {
                if !value.starts_with('/') {
                    return Err(AppError::config(format!(
                        "GUEST_WORK_DIR must be an absolute guest path, got: {}",
                        value
                    )));
                }
            }
            "CONTENTION_LEVELS" => {
                let levels = parse_levels(value)
                    .map_err(|e| AppError::config(format!("Invalid CONTENTION_LEVELS value '{}': {}", value, e)))?;
                if levels.is_empty() {
                    return Err(AppError::config("CONTENTION_LEVELS must name at least one level"));
                }
            }
            "ENABLE_COLOR" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported environment variables with descriptions and examples
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("GCB_OUTPUT_ROOT", "Directory the logs/ tree is written under", "."),
            ("ADB_PATH", "adb executable", "/opt/android-sdk/platform-tools/adb"),
            ("ANDROID_SERIAL", "Serial of the target device", "emulator-5554"),
            ("GUEST_WORK_DIR", "Absolute guest working directory", "/data/local/tmp"),
            ("CONTENTION_DIR", "Host directory with contention payloads", "contention"),
            ("TIMING_SOURCE", "Timing program source file", "timing.cpp"),
            ("TIMING_COMPILER", "Compiler wrapper for the timing program", "lCXX"),
            ("CONTENTION_LEVELS", "Comma-separated contention levels", "NONE,HIGH"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<18} {}\n", var, description));
            help.push_str(&format!("  {:<18} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("Guest Clock Bench Configuration"));
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("GUEST_WORK_DIR", "/data/local/tmp").is_ok());
        assert!(EnvManager::validate_env_var("CONTENTION_LEVELS", "none,HIGH").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("ANDROID_SERIAL", "emulator-5554").is_ok());
        assert!(EnvManager::validate_env_var("SOMETHING_ELSE", "").is_ok());

        assert!(EnvManager::validate_env_var("GUEST_WORK_DIR", "data/local/tmp").is_err());
        assert!(EnvManager::validate_env_var("CONTENTION_LEVELS", "LOW").is_err());
        assert!(EnvManager::validate_env_var("CONTENTION_LEVELS", " , ").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("ADB_PATH", "  ").is_err());
        assert!(EnvManager::validate_env_var("ANDROID_SERIAL", "a b").is_err());
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!EnvManager::load_env_file_from(&dir.path().join(".env"), false).unwrap());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("CONTENTION_LEVELS"));
        assert!(help.contains("Configuration Priority"));
    }
}
