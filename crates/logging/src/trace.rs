//! crates/logging/src/trace.rs
//! Source location that triggers a backtrace dump when logged from.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::levels::CallSite;

/// A `file:line` pair naming one logging statement.
///
/// When a line is emitted from the matching call site, a backtrace of the
/// emitting thread is appended to it. The file is compared against the call
/// site's base name, extension included.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct TraceLocation {
    file: String,
    line: u32,
}

impl TraceLocation {
    /// Builds a location from its parts.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// File name, including its extension.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Reports whether `site` is the location this value names.
    #[must_use]
    pub fn matches(&self, site: &CallSite) -> bool {
        site.line() == self.line && site.file_name() == self.file
    }

    /// Parses a setting where the empty string clears the location.
    ///
    /// # Errors
    ///
    /// See [`TraceLocation::from_str`].
    pub fn parse_optional(text: &str) -> Result<Option<Self>, ConfigError> {
        if text.is_empty() {
            return Ok(None);
        }
        text.parse().map(Some)
    }
}

impl FromStr for TraceLocation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(file), Some(line), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ConfigError::TraceSyntax(s.to_string()));
        };
        if !file.contains('.') {
            return Err(ConfigError::TraceSyntax(s.to_string()));
        }
        let line: i64 = line
            .parse()
            .map_err(|_| ConfigError::TraceSyntax(s.to_string()))?;
        if line <= 0 {
            return Err(ConfigError::TraceLine(s.to_string()));
        }
        let line = u32::try_from(line).map_err(|_| ConfigError::TraceSyntax(s.to_string()))?;
        Ok(Self::new(file, line))
    }
}

impl TryFrom<String> for TraceLocation {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TraceLocation> for String {
    fn from(location: TraceLocation) -> Self {
        location.to_string()
    }
}

impl fmt::Display for TraceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
