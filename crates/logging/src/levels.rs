//! crates/logging/src/levels.rs
//! Verbosity levels and call-site identity.

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use logging_sink::basename;

use crate::error::ConfigError;

/// Verbosity level for V-gated logging.
///
/// A call requesting level `n` is enabled when the effective level for its
/// call site is at least `n`. Levels are signed; the default is `0`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Level(pub i32);

impl Level {
    /// Returns the raw level.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<Level> for i32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|source| ConfigError::Level {
                value: s.to_string(),
                source,
            })
    }
}

/// Source location of a logging statement.
///
/// Call sites key the per-site verbosity cache and supply the `file:line`
/// part of every header. [`CallSite::caller`] captures the location of the
/// nearest caller that is not itself `#[track_caller]`, so the public entry
/// points of this crate report the user's statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    column: u32,
}

impl CallSite {
    /// Builds a call site from explicit coordinates.
    #[must_use]
    pub const fn new(file: &'static str, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    /// Captures the location of the caller.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }

    /// Full source path as recorded by the compiler.
    #[must_use]
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// Line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Column number.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// File name without directories, as rendered in headers.
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        basename(self.file)
    }

    /// File name without directories or `.rs` suffix, as matched by module
    /// patterns.
    #[must_use]
    pub fn module(&self) -> &'static str {
        let name = self.file_name();
        name.strip_suffix(".rs").unwrap_or(name)
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name(), self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parses_signed_integers() {
        assert_eq!("3".parse::<Level>().unwrap(), Level(3));
        assert_eq!(" -1 ".parse::<Level>().unwrap(), Level(-1));
        assert!(matches!(
            "two".parse::<Level>(),
            Err(ConfigError::Level { .. })
        ));
    }

    #[test]
    fn levels_compare_numerically() {
        assert!(Level(-1) < Level(0));
        assert!(Level(2) >= Level(2));
        assert_eq!(Level::default(), Level(0));
    }

    #[test]
    fn caller_reports_this_file() {
        let site = CallSite::caller();
        assert_eq!(site.file_name(), "levels.rs");
        assert_eq!(site.module(), "levels");
        assert_eq!(site.line(), line!() - 3);
    }

    #[test]
    fn module_keeps_other_extensions() {
        let site = CallSite::new("gen/schema.proto", 4, 1);
        assert_eq!(site.file_name(), "schema.proto");
        assert_eq!(site.module(), "schema.proto");
    }

    #[test]
    fn display_uses_basename_and_line() {
        let site = CallSite::new("crates/app/src/server.rs", 88, 9);
        assert_eq!(site.to_string(), "server.rs:88");
    }
}
