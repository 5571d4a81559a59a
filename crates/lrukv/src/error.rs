//! Error types for lrukv

use std::fmt;

/// Result type alias for lrukv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A constructor argument was out of range (capacity must be positive)
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid_capacity() -> Self {
        Error::InvalidArgument("capacity must be a positive integer".to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
