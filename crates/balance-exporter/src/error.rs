//! Error types for balance fetching.

use thiserror::Error;

/// Failure of a single balance fetch.
///
/// Every variant is local to one address: the publisher logs it, counts it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The API endpoint could not be reached (DNS, refused or reset connection, TLS, timeout).
    #[error("connection error: {0}")]
    Connection(String),

    /// The API answered with a status outside 200-299.
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// Status code returned by the API.
        status: u16,
        /// Response body, empty if it could not be read.
        body: String,
    },

    /// The API answered 2xx but the balance could not be extracted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Anything else.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Returns true if the endpoint itself was unreachable, as opposed to having returned a
    /// defined error.
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Self::Connection(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

/// Result type alias for balance fetches.
pub type FetchResult<T> = Result<T, FetchError>;
