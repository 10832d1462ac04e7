//! Error types for playstate
//!
//! The engine itself never fails; errors only arise while loading
//! configuration and scenarios for the driver.

use thiserror::Error;

/// Main error type for playstate
#[derive(Error, Debug)]
pub enum Error {
    /// Errors from the shared configuration layer
    #[error(transparent)]
    Common(#[from] playstate_common::Error),

    /// Scenario file I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario file parse errors
    #[error("Scenario parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Structurally valid scenario with inconsistent content
    #[error("Invalid scenario: {0}")]
    Scenario(String),
}

/// Convenience Result type using playstate Error
pub type Result<T> = std::result::Result<T, Error>;
