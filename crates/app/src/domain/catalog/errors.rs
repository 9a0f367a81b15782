//! Catalog service errors.

use thiserror::Error;

use crate::session::CallError;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("account not found")]
    NotFound,

    #[error("log in again")]
    ReauthRequired(#[source] CallError),

    #[error("failed to load catalog")]
    Backend(#[source] CallError),
}

impl From<CallError> for CatalogServiceError {
    fn from(error: CallError) -> Self {
        if error.needs_login() {
            Self::ReauthRequired(error)
        } else {
            Self::Backend(error)
        }
    }
}
