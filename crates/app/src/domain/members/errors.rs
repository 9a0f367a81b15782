//! Members service errors.

use kiosk::validation::ValidationErrors;
use thiserror::Error;

use crate::session::CallError;

#[derive(Debug, Error)]
pub enum MembersServiceError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("log in again")]
    ReauthRequired(#[source] CallError),

    #[error("member request failed")]
    Backend(#[source] CallError),
}

impl From<CallError> for MembersServiceError {
    fn from(error: CallError) -> Self {
        if error.needs_login() {
            Self::ReauthRequired(error)
        } else {
            Self::Backend(error)
        }
    }
}
