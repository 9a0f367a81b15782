//! Kiosk Session
//!
//! The operator session: access token, PIN, selected reader, default member
//! ids and tenant settings. Created on login and wiped by [`KioskSession::teardown`]
//! when the kiosk idles out or the operator is sent back to the login screen.

use std::{fmt, sync::Arc};

use kiosk::{
    ids::MemberId,
    validation::{ValidationError, validate_pin},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, KioskBackend, SettingsRecord};

mod credentials;
mod retry;

pub use credentials::{AccessToken, OperatorPin};
pub use retry::{CallError, MAX_AUTH_RETRIES, with_reauth};

/// Theme used when the tenant has not configured one.
pub const DEFAULT_THEME: &str = "orange";

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The PIN failed local validation and was never sent.
    #[error(transparent)]
    InvalidPin(ValidationError),

    /// The backend refused the PIN.
    #[error("Login Failed: {0}")]
    LoginFailed(String),

    /// A refresh was requested before anyone logged in.
    #[error("no operator PIN stored")]
    MissingPin,

    /// A call needs a token and there is none.
    #[error("not logged in")]
    NotLoggedIn,

    /// A payment needs a reader and none was selected.
    #[error("no card reader selected")]
    NoReader,

    /// Default member ids have not been loaded yet.
    #[error("default member ids not loaded")]
    NoDefaultMembers,

    /// The token exchange never got an answer.
    #[error("Network error. Please try again.")]
    Network(#[source] BackendError),
}

/// The placeholder member payments are recorded against, and the member
/// used for anonymous donations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultMembers {
    /// Holds payments until they are attributed.
    pub default_member: MemberId,

    /// Receives anonymous donations.
    pub anonymous_member: MemberId,
}

/// Tenant branding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSettings {
    /// UI theme name.
    pub theme: String,

    /// Display name of the tenant.
    pub tenant_name: Option<String>,

    /// Start screen image.
    pub image_url: Option<String>,

    /// Company logo.
    pub company_logo_url: Option<String>,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            tenant_name: None,
            image_url: None,
            company_logo_url: None,
        }
    }
}

impl From<SettingsRecord> for TenantSettings {
    fn from(record: SettingsRecord) -> Self {
        Self {
            theme: record
                .theme
                .filter(|theme| !theme.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_THEME.to_string()),
            tenant_name: record.tenant_name,
            image_url: record.image_url,
            company_logo_url: record.company_name_logo_url,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    pin: Option<OperatorPin>,
    token: Option<AccessToken>,
    reader: Option<String>,
    members: Option<DefaultMembers>,
    settings: TenantSettings,
}

/// Session context shared by every service that talks to the backend.
pub struct KioskSession {
    backend: Arc<dyn KioskBackend>,
    state: RwLock<SessionState>,
}

impl fmt::Debug for KioskSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KioskSession").finish_non_exhaustive()
    }
}

impl KioskSession {
    /// A logged-out session.
    pub fn new(backend: Arc<dyn KioskBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// The backend this session talks to.
    pub fn backend(&self) -> Arc<dyn KioskBackend> {
        Arc::clone(&self.backend)
    }

    /// Validate and exchange the PIN, then store it with the issued token.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidPin`] if the PIN is not six digits.
    /// - [`SessionError::LoginFailed`] if the backend refuses it.
    /// - [`SessionError::Network`] if the exchange fails in transit.
    pub async fn login(&self, pin: &str) -> Result<(), SessionError> {
        validate_pin(pin).map_err(SessionError::InvalidPin)?;

        let pin = OperatorPin::new(pin);
        let token = self.exchange(&pin).await?;

        let mut state = self.state.write().await;

        state.pin = Some(pin);
        state.token = Some(token);

        info!("operator logged in");

        Ok(())
    }

    /// Exchange the stored PIN for a fresh token.
    ///
    /// # Errors
    ///
    /// - [`SessionError::MissingPin`] without sending a request when no PIN is stored.
    /// - Any error [`KioskSession::login`] can return from the exchange itself.
    pub async fn refresh(&self) -> Result<AccessToken, SessionError> {
        let Some(pin) = self.state.read().await.pin.clone() else {
            warn!("token refresh requested without a stored PIN");

            return Err(SessionError::MissingPin);
        };

        let token = self.exchange(&pin).await?;

        self.state.write().await.token = Some(token.clone());

        debug!("access token refreshed");

        Ok(token)
    }

    async fn exchange(&self, pin: &OperatorPin) -> Result<AccessToken, SessionError> {
        let grant = self
            .backend
            .exchange_pin(pin)
            .await
            .map_err(SessionError::Network)?;

        match grant.access_token {
            Some(token) => Ok(token),
            None => Err(SessionError::LoginFailed(
                grant.error.unwrap_or_else(|| "Invalid PIN".to_string()),
            )),
        }
    }

    /// The current access token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotLoggedIn`] if there is none.
    pub async fn token(&self) -> Result<AccessToken, SessionError> {
        self.state
            .read()
            .await
            .token
            .clone()
            .ok_or(SessionError::NotLoggedIn)
    }

    /// Whether a token is held.
    pub async fn is_logged_in(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// Remember the card reader payments are sent to.
    pub async fn select_reader(&self, name: impl Into<String>) {
        let name = name.into();

        info!(reader = %name, "card reader selected");

        self.state.write().await.reader = Some(name);
    }

    /// The selected reader.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoReader`] if none was selected.
    pub async fn reader_name(&self) -> Result<String, SessionError> {
        self.state
            .read()
            .await
            .reader
            .clone()
            .ok_or(SessionError::NoReader)
    }

    /// Store the default member ids.
    pub async fn set_default_members(&self, members: DefaultMembers) {
        self.state.write().await.members = Some(members);
    }

    /// The default member ids.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoDefaultMembers`] if they were never loaded.
    pub async fn default_members(&self) -> Result<DefaultMembers, SessionError> {
        self.state
            .read()
            .await
            .members
            .ok_or(SessionError::NoDefaultMembers)
    }

    /// Shorthand for the anonymous member id.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoDefaultMembers`] if they were never loaded.
    pub async fn anonymous_member(&self) -> Result<MemberId, SessionError> {
        Ok(self.default_members().await?.anonymous_member)
    }

    /// Store tenant branding.
    pub async fn set_settings(&self, settings: TenantSettings) {
        self.state.write().await.settings = settings;
    }

    /// Tenant branding.
    pub async fn settings(&self) -> TenantSettings {
        self.state.read().await.settings.clone()
    }

    /// Forget everything. Secrets are zeroized as they drop.
    pub async fn teardown(&self) {
        *self.state.write().await = SessionState::default();

        info!("session torn down");
    }

    #[cfg(test)]
    pub(crate) async fn restore(&self, pin: &str, token: &str) {
        let mut state = self.state.write().await;

        state.pin = Some(OperatorPin::new(pin));
        state.token = Some(AccessToken::new(token));
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        backend::{MockKioskBackend, TokenGrant},
        test::logged_in_session,
    };

    use super::*;

    #[tokio::test]
    async fn login_stores_token_and_pin() -> TestResult {
        let mut backend = MockKioskBackend::new();

        backend
            .expect_exchange_pin()
            .withf(|pin| pin.expose() == "123456")
            .times(2)
            .returning(|_| {
                Ok(TokenGrant {
                    access_token: Some(AccessToken::new("issued")),
                    error: None,
                })
            });

        let session = KioskSession::new(Arc::new(backend));

        session.login("123456").await?;

        assert_eq!(session.token().await?.expose(), "issued");

        // The stored PIN is what the refresh exchanges.
        session.refresh().await?;

        Ok(())
    }

    #[tokio::test]
    async fn short_pin_is_rejected_locally() {
        let mut backend = MockKioskBackend::new();

        backend.expect_exchange_pin().never();

        let session = KioskSession::new(Arc::new(backend));

        let result = session.login("12345").await;

        assert!(matches!(
            result,
            Err(SessionError::InvalidPin(ValidationError::IncompletePin))
        ));
        assert!(!session.is_logged_in().await);
    }

    #[tokio::test]
    async fn refused_pin_reports_backend_error() {
        let mut backend = MockKioskBackend::new();

        backend.expect_exchange_pin().times(1).returning(|_| {
            Ok(TokenGrant {
                access_token: None,
                error: Some("invalid_client".to_string()),
            })
        });

        let session = KioskSession::new(Arc::new(backend));

        let Err(error) = session.login("654321").await else {
            panic!("login should fail");
        };

        assert_eq!(error.to_string(), "Login Failed: invalid_client");
    }

    #[tokio::test]
    async fn refused_pin_without_detail_reads_invalid_pin() {
        let mut backend = MockKioskBackend::new();

        backend.expect_exchange_pin().times(1).returning(|_| {
            Ok(TokenGrant {
                access_token: None,
                error: None,
            })
        });

        let session = KioskSession::new(Arc::new(backend));

        let Err(error) = session.login("654321").await else {
            panic!("login should fail");
        };

        assert_eq!(error.to_string(), "Login Failed: Invalid PIN");
    }

    #[tokio::test]
    async fn refresh_without_pin_sends_nothing() {
        let mut backend = MockKioskBackend::new();

        backend.expect_exchange_pin().never();

        let session = KioskSession::new(Arc::new(backend));

        assert!(matches!(
            session.refresh().await,
            Err(SessionError::MissingPin)
        ));
    }

    #[tokio::test]
    async fn teardown_forgets_everything() -> TestResult {
        let session = logged_in_session(MockKioskBackend::new()).await;

        session.select_reader("front-desk").await;
        session
            .set_default_members(DefaultMembers {
                default_member: MemberId::new(1),
                anonymous_member: MemberId::new(2),
            })
            .await;

        assert_eq!(session.anonymous_member().await?, MemberId::new(2));

        session.teardown().await;

        assert!(!session.is_logged_in().await);
        assert!(matches!(
            session.reader_name().await,
            Err(SessionError::NoReader)
        ));
        assert!(matches!(
            session.default_members().await,
            Err(SessionError::NoDefaultMembers)
        ));
        assert_eq!(session.settings().await.theme, DEFAULT_THEME);

        Ok(())
    }

    #[test]
    fn blank_theme_falls_back_to_default() {
        let settings = TenantSettings::from(SettingsRecord {
            theme: Some(" ".to_string()),
            tenant_name: Some("Temple".to_string()),
            image_url: None,
            company_name_logo_url: Some("https://cdn.example.org/logo.png".to_string()),
        });

        assert_eq!(settings.theme, DEFAULT_THEME);
        assert_eq!(
            settings.company_logo_url.as_deref(),
            Some("https://cdn.example.org/logo.png")
        );
    }
}
