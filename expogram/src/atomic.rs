use crate::{Bucket, Config, Error};
use core::sync::atomic::{AtomicU64, Ordering};

/// A histogram that uses atomic 64bit counters for each bucket and keeps a
/// cumulative sum of every observed value.
///
/// Observation is lock-free: one bucket counter is incremented and the sum
/// is updated with a compare-and-swap loop over the value's bit pattern, so
/// any number of threads may observe concurrently.
pub struct AtomicHistogram {
    config: Config,
    buckets: Box<[AtomicU64]>,
    sum: AtomicU64,
}

impl AtomicHistogram {
    /// Construct a new atomic histogram from the provided parameters. See
    /// the documentation for [`crate::Config`] to understand their meaning.
    pub fn new(start: f64, factor: f64, count: usize) -> Result<Self, Error> {
        let config = Config::new(start, factor, count)?;

        Ok(Self::with_config(&config))
    }

    /// Creates a new atomic histogram using a provided [`crate::Config`].
    pub fn with_config(config: &Config) -> Self {
        let mut buckets = Vec::with_capacity(config.total_buckets());
        buckets.resize_with(config.total_buckets(), || AtomicU64::new(0));

        Self {
            config: config.clone(),
            buckets: buckets.into(),
            sum: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    /// Record a single observation: exactly one bucket counter is
    /// incremented and the cumulative sum grows by the value.
    ///
    /// Observation is total. NaN cannot be bucketed or summed and is folded
    /// to zero, which lands in the first bucket.
    pub fn observe(&self, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value };

        let index = self.config.value_to_index(value);
        self.buckets[index].fetch_add(1, Ordering::Relaxed);

        let mut current = self.sum.load(Ordering::Relaxed);
        loop {
            let updated = (f64::from_bits(current) + value).to_bits();
            match self.sum.compare_exchange_weak(
                current,
                updated,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(now) => current = now,
            }
        }
    }

    /// The total number of observations, summed across every bucket
    /// including the overflow bucket.
    pub fn count(&self) -> u64 {
        self.buckets
            .iter()
            .map(|bucket| bucket.load(Ordering::Relaxed))
            .sum()
    }

    /// The cumulative sum of all observed values.
    pub fn sum(&self) -> f64 {
        f64::from_bits(self.sum.load(Ordering::Relaxed))
    }

    /// Returns the bucket configuration of the histogram.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot the per-bucket counts in ascending bound order. The final
    /// bucket is the overflow bucket with an infinite upper bound.
    pub fn buckets(&self) -> Vec<Bucket> {
        self.buckets
            .iter()
            .enumerate()
            .map(|(index, count)| Bucket {
                upper: self
                    .config
                    .bounds()
                    .get(index)
                    .copied()
                    .unwrap_or(f64::INFINITY),
                count: count.load(Ordering::Relaxed),
            })
            .collect()
    }
}
