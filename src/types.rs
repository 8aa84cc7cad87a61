//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Guest clock source the timing program was built against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockType {
    /// `std::chrono::high_resolution_clock`
    Time,
    /// The emulated RTC device (`/dev/rtc1`), one-second resolution
    Rtc,
    /// `clock_gettime(CLOCK_REALTIME)` backed by kvmclock
    Kvm,
}

impl ClockType {
    pub const ALL: [ClockType; 3] = [ClockType::Time, ClockType::Rtc, ClockType::Kvm];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClockType::Time => "TIME",
            ClockType::Rtc => "RTC",
            ClockType::Kvm => "KVM",
        }
    }

    /// Latency policy used to reduce this clock's raw timestamps.
    ///
    /// The RTC only ticks once per second, so its samples are reduced by
    /// counting how many reads landed on each tick instead of by differences.
    pub fn parse_method(&self) -> ParseMethod {
        match self {
            ClockType::Time | ClockType::Kvm => ParseMethod::Diffs,
            ClockType::Rtc => ParseMethod::Runs,
        }
    }
}

impl fmt::Display for ClockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TIME" => Ok(ClockType::Time),
            "RTC" => Ok(ClockType::Rtc),
            "KVM" => Ok(ClockType::Kvm),
            _ => Err(AppError::config(format!("Supplied clock type \"{}\" not supported", s))),
        }
    }
}

/// Push worker counts per payload size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentionCounts {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl ContentionCounts {
    pub const fn new(small: usize, medium: usize, large: usize) -> Self {
        Self { small, medium, large }
    }

    /// Number of workers alive while this level is active
    pub fn total(&self) -> usize {
        self.small + self.medium + self.large
    }
}

/// Named contention preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentionLevel {
    None,
    High,
}

impl ContentionLevel {
    pub const ALL: [ContentionLevel; 2] = [ContentionLevel::None, ContentionLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentionLevel::None => "NONE",
            ContentionLevel::High => "HIGH",
        }
    }

    pub fn counts(&self) -> ContentionCounts {
        match self {
            ContentionLevel::None => ContentionCounts::new(0, 0, 0),
            ContentionLevel::High => ContentionCounts::new(12, 12, 12),
        }
    }
}

impl fmt::Display for ContentionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentionLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Ok(ContentionLevel::None),
            "HIGH" => Ok(ContentionLevel::High),
            _ => Err(AppError::config(format!("Supplied contention level \"{}\" not supported", s))),
        }
    }
}

/// Policy for turning raw timestamps into latency samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMethod {
    /// Consecutive differences between timestamps
    Diffs,
    /// Reciprocal of the number of reads observed per distinct timestamp
    Runs,
}

impl ParseMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMethod::Diffs => "DIFFS",
            ParseMethod::Runs => "RUNS",
        }
    }
}

impl fmt::Display for ParseMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMethod {
    type Err = AppError;

    /// Method names are matched exactly; there is no case folding here.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DIFFS" => Ok(ParseMethod::Diffs),
            "RUNS" => Ok(ParseMethod::Runs),
            _ => Err(AppError::parse(format!("Supplied parse method \"{}\" not supported", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_type_parsing_is_case_insensitive() {
        assert_eq!("time".parse::<ClockType>().unwrap(), ClockType::Time);
        assert_eq!("Rtc".parse::<ClockType>().unwrap(), ClockType::Rtc);
        assert_eq!("KVM".parse::<ClockType>().unwrap(), ClockType::Kvm);

        let err = "FOO".parse::<ClockType>().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("FOO"));
    }

    #[test]
    fn test_contention_presets() {
        assert_eq!(ContentionLevel::None.counts().total(), 0);
        assert_eq!(ContentionLevel::High.counts(), ContentionCounts::new(12, 12, 12));
        assert_eq!(ContentionLevel::High.counts().total(), 36);

        let err = "MEDIUM".parse::<ContentionLevel>().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_clock_to_parse_method_mapping() {
        assert_eq!(ClockType::Time.parse_method(), ParseMethod::Diffs);
        assert_eq!(ClockType::Kvm.parse_method(), ParseMethod::Diffs);
        assert_eq!(ClockType::Rtc.parse_method(), ParseMethod::Runs);
    }

    #[test]
    fn test_parse_method_rejects_unknown() {
        assert_eq!("RUNS".parse::<ParseMethod>().unwrap(), ParseMethod::Runs);
        assert!(matches!("MEDIAN".parse::<ParseMethod>(), Err(AppError::Parse(_))));
        assert!("diffs".parse::<ParseMethod>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for clock in ClockType::ALL {
            assert_eq!(clock.to_string().parse::<ClockType>().unwrap(), clock);
        }
        for level in ContentionLevel::ALL {
            assert_eq!(level.to_string().parse::<ContentionLevel>().unwrap(), level);
        }
    }
}
