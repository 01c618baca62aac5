//! Error types for the dashboard client

use thiserror::Error;

/// Dashboard error type
#[derive(Debug, Error)]
pub enum Error {
    /// Backend unreachable, timed out, or the request could not be sent
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("request failed with status: {0}")]
    Status(reqwest::StatusCode),

    /// Response body was not the expected JSON
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Backend answered `success: false`
    #[error("backend rejected request: {0}")]
    Rejected(String),

    /// Input refused before any request was issued
    #[error("invalid input: {0}")]
    Validation(String),

    /// A confirmation arrived with nothing armed
    #[error("no pending action to confirm")]
    NotArmed,

    /// Local file could not be written
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the failures that mean "no update this cycle"
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Status(_) | Error::Parse(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
