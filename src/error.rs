//! Error types shared by both host clients.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the Catbox and Litterbox clients.
#[derive(Error, Debug)]
pub enum Error {
    /// Local path is missing or is not a regular file
    #[error("Invalid file path \"{}\"", .0.display())]
    InvalidFilePath(PathBuf),

    /// Litterbox retention value outside the accepted set
    #[error("Invalid duration \"{0}\", accepted values are 1h, 12h, 24h, 72h")]
    InvalidDuration(String),

    /// Account-scoped operation invoked without a user hash
    #[error("A user hash is required for this operation.")]
    MissingUserHash,

    /// The service answered, but not with what the operation expects.
    /// Carries the response body verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Transport failure (connection, DNS, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a caller-supplied stream or opening an upload failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Input rejected locally, before any request went out
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidFilePath(_) | Self::InvalidDuration(_))
    }

    /// Remote response failed the operation's success test
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The raw response body of a rejected call
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Self::Rejected(text) => Some(text),
            _ => None,
        }
    }
}
