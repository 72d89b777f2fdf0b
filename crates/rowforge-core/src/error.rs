use thiserror::Error;

/// Core error type shared across Rowforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema document cannot be interpreted (bad codes, bad bounds,
    /// unparseable default-value directive).
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    /// The schema violates a generation invariant.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for results returned by Rowforge crates.
pub type Result<T> = std::result::Result<T, Error>;
