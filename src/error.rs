use std::{error::Error as StdError, fmt};

/// Client-facing error taxonomy for the storage engine.
///
/// Invariant violations (malformed page tags, path-stack overflow, double
/// eviction of a referenced page) are not represented here: those are bugs
/// and are reported via `panic!`/`assert!` instead, per the fatal/recoverable
/// split the engine draws between corruption and ordinary misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `find`/`modify` missed, or a referenced record does not exist.
    NotFound,
    /// `insert` collided with an existing key.
    DuplicateKey,
    /// Caller lacks the privilege for the requested operation.
    Unauthorized,
    /// Caller-supplied arguments fail a precondition (bad range, wrong size).
    InvalidArgument(String),
    /// A `VectorFile`/`HashMapFile` would exceed its documented capacity.
    Capacity,
    /// Surfaced only when the OS call itself can be recovered from (e.g. the
    /// sidecar file for a `VectorFile` does not exist yet); block-level I/O
    /// failures are fatal and never reach this variant.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "not found"),
            Error::DuplicateKey => write!(f, "duplicate key"),
            Error::Unauthorized => write!(f, "unauthorized"),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::Capacity => write!(f, "container capacity exceeded"),
            Error::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

impl StdError for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
