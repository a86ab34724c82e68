//! Error types for sthree-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.
//! The bucket registry itself never fails; these errors come from bucket I/O,
//! configuration handling and ACL parsing.

use thiserror::Error;

/// Result type alias for sthree-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sthree-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Unknown canned ACL name
    #[error("Invalid ACL: {0}")]
    InvalidAcl(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error (retryable)
    #[error("Network error: {0}")]
    Network(String),

    /// Storage operation attempted on a bucket handle that is not open
    #[error("Bucket is closed: {0}")]
    BucketClosed(String),

    /// Bucket handle has no live registry to register siblings with
    #[error("Bucket registry unavailable for: {0}")]
    RegistryUnavailable(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) => 2,                       // UsageError
            Error::InvalidAcl(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::Config(_) => 2,                            // UsageError
            Error::Network(_) => 3,                           // NetworkError
            Error::Auth(_) => 4,                              // AuthError
            Error::NotFound(_) => 5,                          // NotFound
            Error::BucketClosed(_) => 6,                      // Conflict
            _ => 1,                                           // GeneralError
        }
    }
}
