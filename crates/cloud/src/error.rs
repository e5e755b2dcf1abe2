//! Typed error type for the cloud crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudError {
    /// Transport, status, or body-decoding failure, as reported by `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl CloudError {
    /// HTTP status of the failed response, if the server answered.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Http(err) => err.status(),
        }
    }
}
