//! Bootstrap service errors.

use thiserror::Error;

use crate::session::CallError;

#[derive(Debug, Error)]
pub enum BootstrapServiceError {
    #[error("log in again")]
    ReauthRequired(#[source] CallError),

    #[error("Error while getting readers. Please contact Administrator")]
    Readers(#[source] CallError),

    #[error("reader {0:?} is not paired with this tenant")]
    UnknownReader(String),

    #[error("Error while getting default Donation Ids. Please contact Administrator")]
    DefaultMembers(#[source] CallError),

    #[error("Please set default donation account ids.")]
    DefaultMembersUnset,

    #[error("failed to load tenant settings")]
    Settings(#[source] CallError),
}

impl BootstrapServiceError {
    /// Route login failures to [`BootstrapServiceError::ReauthRequired`] and
    /// wrap everything else with `wrap`.
    pub(crate) fn from_call(error: CallError, wrap: fn(CallError) -> Self) -> Self {
        if error.needs_login() {
            Self::ReauthRequired(error)
        } else {
            wrap(error)
        }
    }
}
