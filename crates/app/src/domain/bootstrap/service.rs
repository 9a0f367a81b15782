//! Bootstrap service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{error, info};

use crate::{
    backend::Reader,
    domain::bootstrap::errors::BootstrapServiceError,
    session::{DefaultMembers, KioskSession, TenantSettings, with_reauth},
};

#[derive(Debug, Clone)]
pub struct BackendBootstrapService {
    session: Arc<KioskSession>,
}

impl BackendBootstrapService {
    #[must_use]
    pub fn new(session: Arc<KioskSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl BootstrapService for BackendBootstrapService {
    async fn list_readers(&self) -> Result<Vec<Reader>, BootstrapServiceError> {
        with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            async move { backend.list_readers(&token).await }
        })
        .await
        .map_err(|source| BootstrapServiceError::from_call(source, BootstrapServiceError::Readers))
    }

    async fn select_reader(&self, name: &str) -> Result<Reader, BootstrapServiceError> {
        let reader = self
            .list_readers()
            .await?
            .into_iter()
            .find(|reader| reader.name == name)
            .ok_or_else(|| BootstrapServiceError::UnknownReader(name.to_string()))?;

        self.session.select_reader(reader.name.clone()).await;

        Ok(reader)
    }

    async fn load_default_members(&self) -> Result<DefaultMembers, BootstrapServiceError> {
        let ids = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            async move { backend.default_member_ids(&token).await }
        })
        .await
        .map_err(|source| {
            BootstrapServiceError::from_call(source, BootstrapServiceError::DefaultMembers)
        })?;

        let (Some(default_member), Some(anonymous_member)) =
            (ids.default_member.member_id(), ids.anonymous_member.member_id())
        else {
            error!(
                default_member = %ids.default_member,
                anonymous_member = %ids.anonymous_member,
                "default member ids are not configured"
            );

            return Err(BootstrapServiceError::DefaultMembersUnset);
        };

        let members = DefaultMembers {
            default_member,
            anonymous_member,
        };

        self.session.set_default_members(members).await;

        info!(%default_member, %anonymous_member, "default members loaded");

        Ok(members)
    }

    async fn load_settings(&self) -> Result<TenantSettings, BootstrapServiceError> {
        let record = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            async move { backend.settings(&token).await }
        })
        .await
        .map_err(|source| BootstrapServiceError::from_call(source, BootstrapServiceError::Settings))?;

        let settings = TenantSettings::from(record);

        self.session.set_settings(settings.clone()).await;

        Ok(settings)
    }
}

#[automock]
#[async_trait]
pub trait BootstrapService: Send + Sync {
    /// Card readers paired with the tenant.
    async fn list_readers(&self) -> Result<Vec<Reader>, BootstrapServiceError>;

    /// Pick a paired reader by name and remember it for payments.
    async fn select_reader(&self, name: &str) -> Result<Reader, BootstrapServiceError>;

    /// Fetch and remember the placeholder and anonymous member ids.
    async fn load_default_members(&self) -> Result<DefaultMembers, BootstrapServiceError>;

    /// Fetch and remember the tenant branding.
    async fn load_settings(&self) -> Result<TenantSettings, BootstrapServiceError>;
}
