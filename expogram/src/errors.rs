use thiserror::Error;

/// Errors returned for histogram construction.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("bucket start must be positive and finite")]
    InvalidStart,
    #[error("bucket factor must be greater than one and finite")]
    InvalidFactor,
    #[error("bucket count must be non-zero")]
    InvalidCount,
    #[error("bucket bounds exceed the representable range")]
    Overflow,
}
