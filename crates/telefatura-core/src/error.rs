use thiserror::Error;

/// Core error type shared across telefatura crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The XML document does not follow the nested-tag dialect.
    #[error("malformed xml at byte {offset}: {message}")]
    Malformed { offset: usize, message: String },
}

/// Convenience alias for results returned by telefatura crates.
pub type Result<T> = std::result::Result<T, Error>;
