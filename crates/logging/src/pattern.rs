//! crates/logging/src/pattern.rs
//! Per-module verbosity overrides.
//!
//! A [`ModuleSpec`] is an ordered list of `pattern=level` entries. Patterns
//! are matched against a call site's file name with directories and the `.rs`
//! suffix removed. Entries without glob metacharacters are compared literally;
//! everything else is compiled with `globset`, where `*` and `?` never cross a
//! path separator.

use std::fmt;
use std::str::FromStr;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::ConfigError;
use crate::levels::Level;

/// One `pattern=level` entry of a [`ModuleSpec`].
#[derive(Clone, Debug)]
pub struct ModulePattern {
    pattern: String,
    level: Level,
    matcher: Option<GlobMatcher>,
}

impl ModulePattern {
    /// Compiles `pattern` for matching against module names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ModulePattern`] when the glob does not compile.
    pub fn new(pattern: impl Into<String>, level: Level) -> Result<Self, ConfigError> {
        let pattern = pattern.into();
        let matcher = if is_literal(&pattern) {
            None
        } else {
            let glob = GlobBuilder::new(&pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| ConfigError::ModulePattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            Some(glob.compile_matcher())
        };
        Ok(Self {
            pattern,
            level,
            matcher,
        })
    }

    /// Pattern text as supplied.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Level granted to matching modules.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Reports whether the pattern is compared by plain equality.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        self.matcher.is_none()
    }

    /// Reports whether `module` matches this pattern.
    #[must_use]
    pub fn matches(&self, module: &str) -> bool {
        match &self.matcher {
            None => self.pattern == module,
            Some(matcher) => matcher.is_match(module),
        }
    }
}

impl PartialEq for ModulePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.level == other.level
    }
}

impl Eq for ModulePattern {}

fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['\\', '*', '?', '[', ']'])
}

/// Ordered list of module overrides; the first matching entry wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ModuleSpec {
    patterns: Vec<ModulePattern>,
}

impl ModuleSpec {
    /// Builds a spec from already compiled patterns, preserving their order.
    #[must_use]
    pub const fn new(patterns: Vec<ModulePattern>) -> Self {
        Self { patterns }
    }

    /// Reports whether the spec has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Iterates over the entries in match order.
    pub fn iter(&self) -> std::slice::Iter<'_, ModulePattern> {
        self.patterns.iter()
    }

    /// Level of the first entry matching `module`, if any.
    #[must_use]
    pub fn resolve(&self, module: &str) -> Option<Level> {
        self.patterns
            .iter()
            .find(|pattern| pattern.matches(module))
            .map(ModulePattern::level)
    }
}

impl<'a> IntoIterator for &'a ModuleSpec {
    type Item = &'a ModulePattern;
    type IntoIter = std::slice::Iter<'a, ModulePattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromStr for ModuleSpec {
    type Err = ConfigError;

    /// Parses `pattern=N[,pattern=N...]`.
    ///
    /// Empty entries are skipped. Entries with level `0` are accepted but not
    /// stored since they cannot raise verbosity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut patterns = Vec::new();
        for entry in s.split(',') {
            if entry.is_empty() {
                continue;
            }
            let mut parts = entry.split('=');
            let (Some(pattern), Some(value), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(ConfigError::ModuleSyntax(entry.to_string()));
            };
            if pattern.is_empty() || value.is_empty() {
                return Err(ConfigError::ModuleSyntax(entry.to_string()));
            }
            let level: i32 = value
                .parse()
                .map_err(|_| ConfigError::ModuleSyntax(entry.to_string()))?;
            if level < 0 {
                return Err(ConfigError::NegativeModuleLevel(entry.to_string()));
            }
            if level == 0 {
                continue;
            }
            patterns.push(ModulePattern::new(pattern, Level(level))?);
        }
        Ok(Self::new(patterns))
    }
}

impl TryFrom<String> for ModuleSpec {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModuleSpec> for String {
    fn from(spec: ModuleSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", pattern.pattern, pattern.level)?;
        }
        Ok(())
    }
}
