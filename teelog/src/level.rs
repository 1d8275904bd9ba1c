use crate::ConfigError;
use core::sync::atomic::{AtomicUsize, Ordering};
use log::{Level, LevelFilter};
use std::str::FromStr;
use std::sync::Arc;

// indexed by the usize representation of LevelFilter
const LEVEL_FILTERS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// A clonable handle to an atomically-readable severity threshold. The
/// threshold can be raised or lowered at runtime without reconstructing any
/// destination; readers never block writers.
#[derive(Clone)]
pub struct LevelHandle {
    inner: Arc<AtomicUsize>,
}

impl LevelHandle {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            inner: Arc::new(AtomicUsize::new(level as usize)),
        }
    }

    /// Replace the threshold. Takes effect for the next record; if the new
    /// threshold is more verbose than the facade's global gate, the gate is
    /// widened so the records reach the destinations at all.
    pub fn set(&self, level: LevelFilter) {
        self.inner.store(level as usize, Ordering::Relaxed);
        if log::max_level() < level {
            log::set_max_level(level);
        }
    }

    pub fn get(&self) -> LevelFilter {
        LEVEL_FILTERS[self.inner.load(Ordering::Relaxed)]
    }

    /// Whether a record of the given severity passes the threshold.
    pub fn allows(&self, level: Level) -> bool {
        level <= self.get()
    }
}

/// Parse a severity threshold from its configuration string, accepting the
/// level names case-insensitively plus `off`. An unrecognized value is a
/// configuration error for the caller to treat as fatal.
pub fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    LevelFilter::from_str(level).map_err(|_| ConfigError::InvalidLevel(level.to_string()))
}
