//! crates/logging/src/verbosity.rs
//! Global verbosity threshold with per-module overrides.
//!
//! # Design
//!
//! [`Verbosity::enabled`] is called for every V-gated statement, enabled or
//! not, so the common cases avoid locking. The global level and the number of
//! override patterns live in atomics. Only when the global level rejects a
//! request and overrides exist does the check take the state lock, consult the
//! per-call-site memo and, on a miss, match the site's module name against the
//! patterns.
//!
//! # Invariants
//!
//! - A request at level `L` is enabled only when `L` is at most the effective
//!   level of its call site.
//! - Replacing overrides clears the memo, so no cached resolution survives a
//!   change of patterns.
//! - Readers racing a reconfiguration may observe the previous settings or the
//!   new ones, never a mix that leaks resolutions of the old patterns.

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;

use crate::levels::{CallSite, Level};
use crate::pattern::ModuleSpec;

#[derive(Debug, Default)]
struct FilterState {
    spec: ModuleSpec,
    cache: FxHashMap<CallSite, Level>,
}

/// Verbosity filter consulted by V-gated statements.
#[derive(Debug, Default)]
pub struct Verbosity {
    level: AtomicI32,
    filter_length: AtomicUsize,
    state: Mutex<FilterState>,
}

impl Verbosity {
    /// Creates a filter with the given global level and overrides.
    #[must_use]
    pub fn new(level: Level, spec: ModuleSpec) -> Self {
        Self {
            level: AtomicI32::new(level.0),
            filter_length: AtomicUsize::new(spec.len()),
            state: Mutex::new(FilterState {
                spec,
                cache: FxHashMap::default(),
            }),
        }
    }

    /// Current global level.
    #[must_use]
    pub fn level(&self) -> Level {
        Level(self.level.load(Ordering::Acquire))
    }

    /// Copy of the current overrides.
    #[must_use]
    pub fn overrides(&self) -> ModuleSpec {
        self.lock().spec.clone()
    }

    /// Replaces the global level, keeping overrides.
    pub fn set_level(&self, level: Level) {
        let state = self.lock();
        self.apply(state, level, None);
    }

    /// Replaces the overrides, keeping the global level.
    pub fn set_overrides(&self, spec: ModuleSpec) {
        let state = self.lock();
        let level = self.level();
        self.apply(state, level, Some(spec));
    }

    /// Decides whether a request at `requested` from `site` is enabled.
    #[must_use]
    pub fn enabled(&self, site: CallSite, requested: Level) -> bool {
        if self.level.load(Ordering::Acquire) >= requested.0 {
            return true;
        }
        if self.filter_length.load(Ordering::Acquire) == 0 {
            return false;
        }
        let mut state = self.lock();
        let effective = match state.cache.get(&site) {
            Some(level) => *level,
            None => {
                let level = state.spec.resolve(site.module()).unwrap_or_default();
                state.cache.insert(site, level);
                level
            }
        };
        effective >= requested
    }

    /// Number of call sites whose module resolution is memoised.
    #[must_use]
    pub fn cached_sites(&self) -> usize {
        self.lock().cache.len()
    }

    // Lock-free readers see level 0 and no filter while the patterns change.
    fn apply(
        &self,
        mut state: MutexGuard<'_, FilterState>,
        level: Level,
        spec: Option<ModuleSpec>,
    ) {
        self.level.store(0, Ordering::Release);
        self.filter_length.store(0, Ordering::Release);
        if let Some(spec) = spec {
            state.spec = spec;
            state.cache.clear();
        }
        self.filter_length.store(state.spec.len(), Ordering::Release);
        self.level.store(level.0, Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, FilterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
