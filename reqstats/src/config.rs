use serde::Deserialize;

/// Metrics configuration. Exposed metric names are assembled as
/// `{namespace}_{subsystem}_{app_name}_{suffix}`. The bucket parameters
/// describe the response-time histogram: the first upper bound, the
/// geometric growth factor, and the number of finite buckets (for example
/// `0.0001`, `2.0`, `10` spans 0.1ms to ~51ms).
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub namespace: String,
    pub app_name: String,
    pub subsystem: String,
    pub buckets_start: f64,
    pub buckets_factor: f64,
    pub buckets_count: usize,
}
