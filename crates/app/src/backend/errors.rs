//! Backend errors.

use thiserror::Error;

/// Errors raised while talking to the kiosk backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The access token was refused (HTTP 403).
    #[error("access token rejected")]
    Unauthorized,

    /// Transport, timeout or body decoding failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other non-2xx response.
    #[error("request failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,

        /// Response body, as text.
        body: String,
    },

    /// The backend answered but reported failure or omitted the payload.
    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

impl BackendError {
    /// Whether this is the token-expired signal.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
