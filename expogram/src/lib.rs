//! This crate provides histograms with geometrically growing bucket bounds,
//! giving fine resolution at low values and coarse resolution at high values.
//! They are intended for aggregating per-event measurements, such as response
//! latencies in seconds, across very many concurrent observers.
//!
//! The bucket layout is determined by a [`Config`] built from three
//! parameters: the upper bound of the first bucket, the growth factor applied
//! to each successive bound, and the number of finite buckets. A value is
//! counted in the first bucket whose upper bound is greater than or equal to
//! it; values beyond the last bound are counted in an implicit overflow
//! bucket.
//!
//! [`AtomicHistogram`] stores one atomic counter per bucket plus a cumulative
//! sum of all observed values, so observation is lock-free and safe from any
//! number of threads.

mod atomic;
mod bucket;
mod config;
mod errors;

pub use atomic::AtomicHistogram;
pub use bucket::Bucket;
pub use config::Config;
pub use errors::Error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_counts_include_overflow() {
        let histogram = AtomicHistogram::new(0.0001, 2.0, 10).unwrap();
        assert_eq!(histogram.buckets().len(), 11);

        let histogram = AtomicHistogram::new(1.0, 10.0, 4).unwrap();
        assert_eq!(histogram.buckets().len(), 5);
    }

    #[test]
    fn observations_are_totaled() {
        let histogram = AtomicHistogram::new(0.001, 2.0, 8).unwrap();

        for _ in 0..100 {
            histogram.observe(0.0015);
        }
        histogram.observe(1000.0);

        assert_eq!(histogram.count(), 101);
        assert_eq!(
            histogram.count(),
            histogram.buckets().iter().map(|b| b.count()).sum::<u64>()
        );
    }
}
