//! crates/logging/src/config.rs
//! Construction-time settings for a logging instance.

use std::time::Duration;

use crate::error::ConfigError;
use crate::hub::{DEFAULT_RELAY_CAPACITY, DEFAULT_SUBSCRIBER_CAPACITY};
use crate::levels::Level;
use crate::pattern::ModuleSpec;
use crate::trace::TraceLocation;

/// Environment variable holding the global verbosity level.
pub const ENV_VERBOSITY: &str = "LOGGING_V";
/// Environment variable holding the module override list.
pub const ENV_VMODULE: &str = "LOGGING_VMODULE";
/// Environment variable holding the backtrace trigger location.
pub const ENV_BACKTRACE_AT: &str = "LOGGING_BACKTRACE_AT";

/// Default interval of the background flush daemon.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);
/// Default bound on the flush performed before a fatal exit.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Shortest period the background flush runs at; smaller values are raised
/// to it.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Settings applied when a [`Logging`](crate::Logging) instance is built.
///
/// Verbosity, overrides and the trace location can also be changed at run
/// time through the instance; the remaining fields are fixed once built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoggingConfig {
    /// Global verbosity level.
    pub verbosity: Level,
    /// Per-module overrides.
    pub vmodule: ModuleSpec,
    /// Statement whose output is followed by a backtrace.
    pub backtrace_at: Option<TraceLocation>,
    /// Capacity of the relay queue feeding the dispatcher.
    pub relay_capacity: usize,
    /// Capacity of each subscriber's queue.
    pub subscriber_capacity: usize,
    /// Period of the background flush; `None` disables the daemon. Periods
    /// below [`MIN_FLUSH_INTERVAL`] are raised to it.
    pub flush_interval: Option<Duration>,
    /// Bound on the flush attempted before a fatal exit.
    pub flush_timeout: Duration,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbosity: Level::default(),
            vmodule: ModuleSpec::default(),
            backtrace_at: None,
            relay_capacity: DEFAULT_RELAY_CAPACITY,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            flush_interval: Some(DEFAULT_FLUSH_INTERVAL),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

impl LoggingConfig {
    /// Reads [`ENV_VERBOSITY`], [`ENV_VMODULE`] and [`ENV_BACKTRACE_AT`] on
    /// top of the defaults. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the first variable that fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`LoggingConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns the first value that fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_VERBOSITY) {
            config.apply_verbosity(&value)?;
        }
        if let Some(value) = lookup(ENV_VMODULE) {
            config.apply_vmodule(&value)?;
        }
        if let Some(value) = lookup(ENV_BACKTRACE_AT) {
            config.apply_backtrace_at(&value)?;
        }
        Ok(config)
    }

    /// Parses and applies a verbosity level such as `"2"`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Level`] for non-integers.
    pub fn apply_verbosity(&mut self, value: &str) -> Result<(), ConfigError> {
        self.verbosity = value.parse()?;
        Ok(())
    }

    /// Parses and applies an override list such as `"server=2,gfs*=3"`.
    ///
    /// # Errors
    ///
    /// See [`ModuleSpec`]'s `FromStr` implementation.
    pub fn apply_vmodule(&mut self, value: &str) -> Result<(), ConfigError> {
        self.vmodule = value.parse()?;
        Ok(())
    }

    /// Parses and applies a trace location such as `"server.rs:120"`; the
    /// empty string clears it.
    ///
    /// # Errors
    ///
    /// See [`TraceLocation`]'s `FromStr` implementation.
    pub fn apply_backtrace_at(&mut self, value: &str) -> Result<(), ConfigError> {
        self.backtrace_at = TraceLocation::parse_optional(value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.verbosity, Level(0));
        assert!(config.vmodule.is_empty());
        assert!(config.backtrace_at.is_none());
        assert_eq!(config.relay_capacity, 10);
        assert_eq!(config.subscriber_capacity, 100);
        assert_eq!(config.flush_interval, Some(Duration::from_secs(30)));
        assert_eq!(config.flush_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = LoggingConfig::from_lookup(lookup(&[
            (ENV_VERBOSITY, "2"),
            (ENV_VMODULE, "server=3"),
            (ENV_BACKTRACE_AT, "server.rs:40"),
        ]))
        .unwrap();
        assert_eq!(config.verbosity, Level(2));
        assert_eq!(config.vmodule.to_string(), "server=3");
        assert_eq!(config.backtrace_at, Some(TraceLocation::new("server.rs", 40)));
    }

    #[test]
    fn test_from_lookup_without_variables_is_default() {
        let config = LoggingConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    fn test_from_lookup_reports_bad_values() {
        let result = LoggingConfig::from_lookup(lookup(&[(ENV_VMODULE, "server")]));
        assert!(matches!(result, Err(ConfigError::ModuleSyntax(_))));

        let result = LoggingConfig::from_lookup(lookup(&[(ENV_VERBOSITY, "loud")]));
        assert!(matches!(result, Err(ConfigError::Level { .. })));
    }

    #[test]
    fn test_apply_backtrace_at_clears_on_empty() {
        let mut config = LoggingConfig::default();
        config.apply_backtrace_at("main.rs:9").unwrap();
        assert!(config.backtrace_at.is_some());
        config.apply_backtrace_at("").unwrap();
        assert!(config.backtrace_at.is_none());
    }

    #[test]
    fn test_failed_apply_keeps_previous_value() {
        let mut config = LoggingConfig::default();
        config.apply_vmodule("a=1").unwrap();
        assert!(config.apply_vmodule("a=-1").is_err());
        assert_eq!(config.vmodule.to_string(), "a=1");
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn test_config_serde_roundtrip() {
            let mut config = LoggingConfig::default();
            config.apply_verbosity("1").unwrap();
            config.apply_vmodule("gfs*=3,server=2").unwrap();
            config.apply_backtrace_at("server.rs:12").unwrap();
            config.flush_interval = None;

            let json = serde_json::to_string(&config).unwrap();
            let decoded: LoggingConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, config);
        }

        #[test]
        fn test_textual_fields_serialize_as_strings() {
            let mut config = LoggingConfig::default();
            config.apply_vmodule("server=2").unwrap();
            let value = serde_json::to_value(&config).unwrap();
            assert_eq!(value["vmodule"], "server=2");
            assert_eq!(value["verbosity"], 0);
        }

        #[test]
        fn test_missing_fields_take_defaults() {
            let decoded: LoggingConfig =
                serde_json::from_str(r#"{"verbosity": 3, "vmodule": "db=1"}"#).unwrap();
            assert_eq!(decoded.verbosity, Level(3));
            assert_eq!(decoded.vmodule.to_string(), "db=1");
            assert_eq!(decoded.subscriber_capacity, 100);
        }

        #[test]
        fn test_invalid_vmodule_is_rejected() {
            let result = serde_json::from_str::<LoggingConfig>(r#"{"vmodule": "db=-1"}"#);
            assert!(result.is_err());
        }
    }
}
