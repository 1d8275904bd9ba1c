//! This crate aggregates the request-serving metrics for one process: a
//! monotonic request counter, response counters partitioned by
//! `(status, method)`, and exponential-bucket response-time histograms
//! partitioned by `status`. The registry's state renders in the Prometheus
//! text exposition format for an external scrape endpoint to serve.
//!
//! All instruments are built for very many concurrent callers: every update
//! is a per-entry atomic, label entries are created lazily on first use,
//! and no lock is ever held across two label-tuples' updates.
//!
//! The registry can be used two ways. A [`Metrics`] handle can be
//! constructed explicitly and passed into request handlers. Alternatively,
//! [`init`] installs a handle process-wide once, after which the
//! module-level functions ([`inc_request_counter`],
//! [`inc_response_counter`], [`observe_response_time`]) resolve it
//! implicitly. Calling any of those before [`init`] panics: a process that
//! silently emits zero metrics is a worse failure than a loud crash at the
//! first call site.

mod config;
mod counters;
mod errors;
mod formatter;
mod registry;

pub use config::Config;
pub use counters::Counter;
pub use errors::Error;
pub use registry::{Metrics, ResponseLabels};

use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Build the registry described by the config and install it process-wide.
/// Fails on invalid bucket parameters or when a registry is already
/// installed; both are fatal configuration errors.
pub fn init(config: &Config) -> Result<(), Error> {
    let metrics = Metrics::new(config)?;
    METRICS.set(metrics).map_err(|_| Error::AlreadyInitialized)
}

/// The installed registry.
///
/// # Panics
/// Panics when called before [`init`]. Pre-init use is a programming
/// error surfaced at the first call site rather than silently dropped.
pub fn metrics() -> &'static Metrics {
    METRICS.get().expect("metrics used before init")
}

/// Count one received request on the installed registry.
pub fn inc_request_counter() {
    metrics().inc_request_counter()
}

/// Count one `(status, method)` response on the installed registry.
pub fn inc_response_counter(status: &str, method: &str) {
    metrics().inc_response_counter(status, method)
}

/// Record one response time, in seconds, on the installed registry.
pub fn observe_response_time(status: &str, seconds: f64) {
    metrics().observe_response_time(status, seconds)
}
