//! This crate provides a leveled logging backend that fans each record out
//! to one or more independently-encoded destinations.
//!
//! The core of this crate is the `TeeLog` type, which is constructed using
//! the `TeeLogBuilder` by pairing each destination with an encoder. After
//! building the `TeeLog`, it can be registered as the global logger using
//! the `start` method, which hands back a `LevelHandle` for changing the
//! severity threshold at runtime without rebuilding any destination.
//!
//! Destinations implement the `Output` trait. `Stdout` writes to the
//! console and is usually paired with the colorized `console_format`
//! encoder. `RotatingFile` owns a log file and rotates it to a timestamped
//! backup once a size threshold is reached; backups are pruned by count and
//! age and optionally gzip-compressed by a background worker so the write
//! path never waits on cleanup.
//!
//! For the common file-plus-optional-console arrangement, `init` wires the
//! whole thing up from a `Config`: a rotating file destination with the
//! structured JSON encoder, plus a console destination when enabled, both
//! gated by one configured threshold. Records carry structured key-value
//! fields via the `log` crate's key-value support, and the JSON encoding
//! preserves field names and types with a canonical ISO-8601 timestamp.

pub use log::*;

mod config;
mod error;
mod format;
mod level;
#[macro_use]
mod macros;
mod nop;
mod output;
mod tee;

pub use config::*;
pub use error::*;
pub use format::*;
pub use level::*;
pub use nop::*;
pub use output::*;
pub use tee::*;

pub(crate) type LogBuffer = Vec<u8>;

/// A type which implements a tee-composed logging backend.
pub struct TeeLog {
    pub(crate) logger: Box<dyn Log>,
    pub(crate) level_handle: LevelHandle,
}

impl TeeLog {
    /// The handle controlling the severity threshold for this logger's
    /// destinations.
    pub fn level_handle(&self) -> LevelHandle {
        self.level_handle.clone()
    }

    /// Register the logger and return the handle controlling the severity
    /// threshold for the registered destinations.
    pub fn start(self) -> LevelHandle {
        let level_filter = self.level_handle.get();
        log::set_boxed_logger(self.logger)
            .map(|()| log::set_max_level(level_filter))
            .expect("failed to start logger");
        self.level_handle
    }
}

/// Build and register the process-wide logger described by the config: a
/// rotating file destination with the structured JSON encoder, plus a
/// colorized console destination when `stdout` is set.
///
/// Configuration errors (an unrecognized level, a zero size threshold, an
/// unopenable file) are returned rather than defaulted; a process whose
/// logging cannot be trusted should not come up. Logging calls made before
/// this returns are discarded by the `log` crate's default logger.
pub fn init(config: &Config) -> Result<LevelHandle, ConfigError> {
    let level = parse_level(&config.level)?;

    let policy = RotationPolicy {
        max_size: config.max_size,
        max_backups: config.max_backups,
        max_age: config.max_age,
        compress: config.compress,
    };
    let file = RotatingFile::new(&config.filename, policy)?;

    let mut builder = TeeLogBuilder::new()
        .level(level)
        .sink(json_format, Box::new(file));

    if config.stdout {
        builder = builder.sink(console_format, Box::new(Stdout::new()));
    }

    Ok(builder.build().start())
}
