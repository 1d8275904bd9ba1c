use crate::{Config, Counter, Error};

use ahash::RandomState;
use expogram::AtomicHistogram;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Identifies one response-counter aggregation bucket. The label set is a
/// fixed-arity struct rather than a string map: the shape is checked at
/// compile time while the runtime cardinality stays open-ended.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponseLabels {
    pub status: String,
    pub method: String,
}

/// Aggregates request and response instruments for one serving process.
///
/// A `Metrics` is an explicitly constructed handle meant to be passed into
/// request handlers (or installed process-wide with [`crate::init`]). All
/// three instruments are safe under unbounded concurrent callers: updates
/// are per-entry atomics, and the label maps take a read lock on the hot
/// path with a write lock only to create a missing entry. Entries are
/// created lazily on first use and live for the process lifetime; bounding
/// label cardinality is the caller's responsibility.
pub struct Metrics {
    pub(crate) prefix: String,
    pub(crate) buckets: expogram::Config,
    pub(crate) requests: Counter,
    pub(crate) responses: RwLock<HashMap<ResponseLabels, Arc<Counter>, RandomState>>,
    pub(crate) response_times: RwLock<HashMap<String, Arc<AtomicHistogram>, RandomState>>,
}

impl Metrics {
    /// Build a registry from configuration. Invalid histogram bucket
    /// parameters are a fatal configuration error.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let buckets = expogram::Config::new(
            config.buckets_start,
            config.buckets_factor,
            config.buckets_count,
        )?;

        Ok(Self {
            prefix: format!(
                "{}_{}_{}",
                config.namespace, config.subsystem, config.app_name
            ),
            buckets,
            requests: Counter::new(),
            responses: RwLock::new(HashMap::with_hasher(RandomState::new())),
            response_times: RwLock::new(HashMap::with_hasher(RandomState::new())),
        })
    }

    /// Count one received request.
    pub fn inc_request_counter(&self) {
        self.requests.increment();
    }

    /// The current request count.
    pub fn requests(&self) -> u64 {
        self.requests.value()
    }

    /// Count one response for the `(status, method)` label pair, creating
    /// the pair's counter on first use.
    pub fn inc_response_counter(&self, status: &str, method: &str) {
        let labels = ResponseLabels {
            status: status.to_string(),
            method: method.to_string(),
        };

        if let Some(counter) = self.responses.read().get(&labels) {
            counter.increment();
            return;
        }

        let counter = self.responses.write().entry(labels).or_default().clone();
        counter.increment();
    }

    /// Record one response time, in seconds, into the histogram for the
    /// `status` label, creating the label's histogram on first use.
    pub fn observe_response_time(&self, status: &str, seconds: f64) {
        if let Some(histogram) = self.response_times.read().get(status) {
            histogram.observe(seconds);
            return;
        }

        let histogram = self
            .response_times
            .write()
            .entry(status.to_string())
            .or_insert_with(|| Arc::new(AtomicHistogram::with_config(&self.buckets)))
            .clone();
        histogram.observe(seconds);
    }
}
