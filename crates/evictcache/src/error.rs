//! Error types for evictcache configuration

use std::fmt;
use std::io;

/// Result type alias for evictcache configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a cache from configuration.
///
/// Cache reads and writes never fail; a miss is an `Option::None` and a
/// zero-capacity cache silently drops writes.
#[derive(Debug)]
pub enum Error {
    /// Policy name is not one of `lru` or `lfu`
    UnknownPolicy(String),

    /// Configuration is well-formed but semantically invalid
    InvalidConfig(String),

    /// I/O error while reading a configuration file
    Io(io::Error),

    /// Configuration file is not valid JSON for `CacheConfig`
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownPolicy(name) => {
                write!(f, "Unknown eviction policy: '{}' (expected 'lru' or 'lfu')", name)
            }
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
