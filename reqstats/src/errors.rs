use thiserror::Error;

/// Errors returned for registry initialization. All of these are fatal: a
/// process whose metrics cannot be trusted should not come up silently.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("metrics registry is already initialized")]
    AlreadyInitialized,
    #[error(transparent)]
    Buckets(#[from] expogram::Error),
}
