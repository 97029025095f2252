//! crates/logging/src/error.rs
//! Errors surfaced by configuration setters and global initialisation.

use std::num::ParseIntError;

use thiserror::Error;

/// Rejected configuration input.
///
/// Setters that return this error leave the previous settings untouched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A vmodule entry was not of the form `pattern=N`.
    #[error("syntax error: expect comma-separated list of filename=N, got {0:?}")]
    ModuleSyntax(String),
    /// A vmodule entry carried a negative level.
    #[error("negative value for vmodule level in {0:?}")]
    NegativeModuleLevel(String),
    /// A vmodule pattern is not a valid glob.
    #[error("invalid vmodule pattern '{pattern}': {source}")]
    ModulePattern {
        /// The offending pattern.
        pattern: String,
        /// Compilation failure reported by `globset`.
        #[source]
        source: globset::Error,
    },
    /// A trace location was not of the form `file.rs:N`.
    #[error("syntax error: expect file.rs:234, got {0:?}")]
    TraceSyntax(String),
    /// A trace location named a line that is zero or negative.
    #[error("negative or zero line in trace location {0:?}")]
    TraceLine(String),
    /// A verbosity level was not an integer.
    #[error("invalid verbosity level {value:?}: {source}")]
    Level {
        /// The rejected text.
        value: String,
        /// Integer parse failure.
        #[source]
        source: ParseIntError,
    },
}

/// Failure to install the process-wide logging instance.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// [`init`](crate::init) ran after the global instance already existed.
    #[error("the global logging instance is already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn pattern_error_preserves_source() {
        let source = globset::Glob::new("[").unwrap_err();
        let error = ConfigError::ModulePattern {
            pattern: "[".into(),
            source,
        };
        assert!(error.to_string().contains("invalid vmodule pattern '['"));
        assert!(error.source().is_some());
    }

    #[test]
    fn syntax_errors_name_the_expected_form() {
        let error = ConfigError::ModuleSyntax("x".into());
        assert!(error.to_string().contains("filename=N"));
        let error = ConfigError::TraceSyntax("x".into());
        assert!(error.to_string().contains("file.rs:234"));
    }
}
