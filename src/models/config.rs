//! Configuration data model and validation

use crate::types::{AppError, ClockType, ContentionLevel, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the `logs/` tree is written under
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// adb executable used for every device transfer
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// Device serial passed as `adb -s`; adb picks the only device when unset
    #[serde(default)]
    pub device_serial: Option<String>,

    /// Guest directory holding the timing program, its log and pushed payloads
    #[serde(default = "default_guest_work_dir")]
    pub guest_work_dir: String,

    /// Host directory holding the small/med/large contention payloads
    #[serde(default = "default_contention_dir")]
    pub contention_dir: PathBuf,

    /// Source of the guest timing program
    #[serde(default = "default_timing_source")]
    pub timing_source: PathBuf,

    /// Cross-compiler wrapper invoked as `<compiler> <source> <output> <CLOCK>`
    #[serde(default = "default_timing_compiler")]
    pub timing_compiler: String,

    /// Contention levels to benchmark, in order
    #[serde(default = "default_contention_levels")]
    pub contention_levels: Vec<ContentionLevel>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            adb_path: default_adb_path(),
            device_serial: None,
            guest_work_dir: default_guest_work_dir(),
            contention_dir: default_contention_dir(),
            timing_source: default_timing_source(),
            timing_compiler: default_timing_compiler(),
            contention_levels: default_contention_levels(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.output_root.as_os_str().is_empty() {
            return Err(AppError::config("Output root cannot be empty"));
        }

        if self.adb_path.trim().is_empty() {
            return Err(AppError::config("adb path cannot be empty"));
        }

        if let Some(serial) = &self.device_serial {
            if serial.trim().is_empty() {
                return Err(AppError::config("Device serial cannot be empty when set"));
            }
        }

        if !self.guest_work_dir.starts_with('/') {
            return Err(AppError::config(format!(
                "Guest work directory must be absolute: {}",
                self.guest_work_dir
            )));
        }

        if self.contention_levels.is_empty() {
            return Err(AppError::config("At least one contention level is required"));
        }

        Ok(())
    }

    /// Absolute directory the benchmark writes under.
    ///
    /// Relative roots are anchored at the process working directory; failing
    /// to determine that directory is a configuration error.
    pub fn resolve_work_dir(&self) -> Result<PathBuf> {
        if self.output_root.as_os_str().is_empty() {
            return Err(AppError::config("Could not find benchmark working directory"));
        }
        if self.output_root.is_absolute() {
            return Ok(self.output_root.clone());
        }
        let cwd = std::env::current_dir()
            .map_err(|e| AppError::config(format!("Could not find benchmark working directory: {}", e)))?;
        Ok(cwd.join(&self.output_root))
    }

    /// `logs/<clock>/<level>` under the resolved working directory
    pub fn run_dir(&self, clock: ClockType, level: ContentionLevel) -> Result<PathBuf> {
        Ok(self
            .resolve_work_dir()?
            .join("logs")
            .join(clock.as_str())
            .join(level.as_str()))
    }

    /// Fixed guest path the timing program writes its timestamps to
    pub fn guest_log_path(&self) -> String {
        guest_join(&self.guest_work_dir, crate::defaults::GUEST_LOG_FILE)
    }

    /// Guest path the timing program is installed at
    pub fn guest_exec_path(&self) -> String {
        guest_join(&self.guest_work_dir, crate::defaults::GUEST_EXEC_NAME)
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(root) = std::env::var("GCB_OUTPUT_ROOT") {
            self.output_root = PathBuf::from(root);
        }

        if let Ok(adb) = std::env::var("ADB_PATH") {
            self.adb_path = adb;
        }

        if let Ok(serial) = std::env::var("ANDROID_SERIAL") {
            let serial = serial.trim().to_string();
            if !serial.is_empty() {
                self.device_serial = Some(serial);
            }
        }

        if let Ok(dir) = std::env::var("GUEST_WORK_DIR") {
            self.guest_work_dir = dir;
        }

        if let Ok(dir) = std::env::var("CONTENTION_DIR") {
            self.contention_dir = PathBuf::from(dir);
        }

        if let Ok(source) = std::env::var("TIMING_SOURCE") {
            self.timing_source = PathBuf::from(source);
        }

        if let Ok(compiler) = std::env::var("TIMING_COMPILER") {
            self.timing_compiler = compiler;
        }

        if let Ok(levels) = std::env::var("CONTENTION_LEVELS") {
            self.contention_levels = parse_levels(&levels)
                .map_err(|e| AppError::config(format!("Invalid CONTENTION_LEVELS value '{}': {}", levels, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Parse a comma-separated contention level list
pub fn parse_levels(value: &str) -> Result<Vec<ContentionLevel>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn guest_join(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

/// Destination for a contention worker: the payload's file name suffixed with
/// the worker index, inside the guest work directory.
pub fn guest_payload_path(guest_work_dir: &str, source: &Path, index: usize) -> String {
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "payload".to_string());
    guest_join(guest_work_dir, &format!("{}{}", base, index))
}

// Default value functions for serde
fn default_output_root() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_OUTPUT_ROOT)
}

fn default_adb_path() -> String {
    crate::defaults::DEFAULT_ADB_PATH.to_string()
}

fn default_guest_work_dir() -> String {
    crate::defaults::DEFAULT_GUEST_WORK_DIR.to_string()
}

fn default_contention_dir() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_CONTENTION_DIR)
}

fn default_timing_source() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_TIMING_SOURCE)
}

fn default_timing_compiler() -> String {
    crate::defaults::DEFAULT_TIMING_COMPILER.to_string()
}

fn default_contention_levels() -> Vec<ContentionLevel> {
    ContentionLevel::ALL.to_vec()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
