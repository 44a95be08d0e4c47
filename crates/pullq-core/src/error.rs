use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Reading a cursor before a successful advance, after exhaustion, or
    /// after a restart with no subsequent advance; also raised by aggregates
    /// and element accessors on empty (or over-full, for `single`) input.
    #[error("operation is not valid due to the current state of the object")]
    InvalidState,

    #[error("argument out of range: {0}")]
    OutOfRange(&'static str),

    #[error("an entry with the same key already exists: {0}")]
    DuplicateKey(String),

    #[error("key does not exist")]
    KeyNotFound,

    #[error("operation is not supported on a read-only view")]
    Unsupported,
}
