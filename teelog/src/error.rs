use thiserror::Error;

/// Errors returned when constructing a logger from configuration. All of
/// these are fatal at initialization.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unrecognized log level: {0:?}")]
    InvalidLevel(String),
    #[error("max_size must be greater than zero")]
    InvalidMaxSize,
    #[error("failed to open log destination: {0}")]
    Io(#[from] std::io::Error),
}
