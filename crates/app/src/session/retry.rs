//! Bounded re-authentication.
//!
//! Every backend call runs through [`with_reauth`]. A rejected token is
//! refreshed once and the call repeated once; a second rejection sends the
//! operator back to the login screen.

use std::future::Future;

use thiserror::Error;
use tracing::warn;

use crate::{
    backend::BackendError,
    session::{AccessToken, KioskSession, SessionError},
};

/// Number of times a call is repeated after a token refresh.
pub const MAX_AUTH_RETRIES: usize = 1;

/// Failure of a call made through [`with_reauth`].
#[derive(Debug, Error)]
pub enum CallError {
    /// The refreshed token was rejected too.
    #[error("access token rejected after refresh; log in again")]
    ReauthRequired,

    /// No token could be obtained.
    #[error("session expired: {0}")]
    SessionExpired(#[source] SessionError),

    /// Any other backend failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CallError {
    /// Whether the operator must log in again.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::ReauthRequired | Self::SessionExpired(_))
    }
}

/// Run `call` with the session token, refreshing and retrying on
/// [`BackendError::Unauthorized`] at most [`MAX_AUTH_RETRIES`] times.
///
/// # Errors
///
/// - [`CallError::SessionExpired`] when there is no token or the refresh fails.
/// - [`CallError::ReauthRequired`] when the call is still rejected after refreshing.
/// - [`CallError::Backend`] for every other failure.
pub async fn with_reauth<T, F, Fut>(session: &KioskSession, mut call: F) -> Result<T, CallError>
where
    F: FnMut(AccessToken) -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut token = session.token().await.map_err(CallError::SessionExpired)?;
    let mut retries = 0;

    loop {
        match call(token).await {
            Err(BackendError::Unauthorized) if retries < MAX_AUTH_RETRIES => {
                retries += 1;

                warn!(retries, "access token rejected, refreshing");

                token = session
                    .refresh()
                    .await
                    .map_err(CallError::SessionExpired)?;
            }
            Err(BackendError::Unauthorized) => return Err(CallError::ReauthRequired),
            result => return result.map_err(CallError::Backend),
        }
    }
}
