//! Error types for the persistence layer
//!
//! Cache operations themselves never fail; only backing stores do.

use std::fmt;
use std::io;

/// Result type alias for backing store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for backing store operations
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(io::Error),

    /// Failure reported by a custom backing store
    Backing(String),

    /// Key cannot be represented by the backing store
    InvalidKey(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Backing(msg) => write!(f, "Backing store error: {}", msg),
            Error::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display_and_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::Other, "disk gone"));
        assert_eq!(err.to_string(), "I/O error: disk gone");
        assert!(err.source().is_some());

        let err = Error::InvalidKey("empty".into());
        assert_eq!(err.to_string(), "Invalid key: empty");
        assert!(err.source().is_none());
    }
}
