//! crates/logging-sink/src/severity.rs
//! Severity levels understood by the logging core.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity attached to every emitted line.
///
/// Variants are declared in ascending order so the derived [`Ord`] matches
/// the escalation `Info < Warning < Error < Fatal`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Severity {
    /// Informational output.
    Info,
    /// Something unexpected that does not stop the program.
    Warning,
    /// A failure; events carry a captured backtrace.
    Error,
    /// A failure after which the process terminates.
    Fatal,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Self; 4] = [Self::Info, Self::Warning, Self::Error, Self::Fatal];

    /// Single character used as the first byte of a rendered header.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Info => 'I',
            Self::Warning => 'W',
            Self::Error => 'E',
            Self::Fatal => 'F',
        }
    }

    /// Upper-case name, as delivered in events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// Position of the severity in [`Severity::ALL`], used to index counters.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Reports whether events of this severity capture a backtrace.
    #[must_use]
    pub const fn captures_stack(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a severity name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "I" | "INFO" => Ok(Self::Info),
            "W" | "WARN" | "WARNING" => Ok(Self::Warning),
            "E" | "ERROR" => Ok(Self::Error),
            "F" | "FATAL" => Ok(Self::Fatal),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_are_ordered() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn index_matches_position_in_all() {
        for (i, severity) in Severity::ALL.iter().enumerate() {
            assert_eq!(severity.index(), i);
        }
    }

    #[test]
    fn chars_and_names() {
        let chars: String = Severity::ALL.iter().map(|s| s.as_char()).collect();
        assert_eq!(chars, "IWEF");
        assert_eq!(Severity::Warning.to_string(), "WARNING");
    }

    #[test]
    fn only_error_and_fatal_capture_stacks() {
        assert!(!Severity::Info.captures_stack());
        assert!(!Severity::Warning.captures_stack());
        assert!(Severity::Error.captures_stack());
        assert!(Severity::Fatal.captures_stack());
    }

    #[test]
    fn parse_accepts_names_and_chars() {
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("W".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("Error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("FATAL".parse::<Severity>().unwrap(), Severity::Fatal);
        assert!("verbose".parse::<Severity>().is_err());
    }
}
