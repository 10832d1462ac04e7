//! Common error types for playstate

use thiserror::Error;

/// Common result type for playstate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across playstate crates
///
/// The engine itself never fails; these errors only come from the ambient
/// layer (configuration and scenario files).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
