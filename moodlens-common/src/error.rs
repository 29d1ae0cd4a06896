//! Common error types for moodlens

use thiserror::Error;

/// Common result type for moodlens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across moodlens crates
#[derive(Error, Debug)]
pub enum Error {
    /// Config file exists but could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
