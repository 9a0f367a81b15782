//! Members service.

use std::sync::Arc;

use async_trait::async_trait;
use kiosk::{
    ids::MemberId,
    members::{ContactMatch, MemberSummary, NewMember},
};
use mockall::automock;
use tracing::{info, warn};

use crate::{
    backend::{BackendError, MemberQuery, MemberRecord},
    domain::members::{
        errors::MembersServiceError,
        records::{request_from_member, summary_from_record},
    },
    session::{CallError, KioskSession, with_reauth},
};

#[derive(Debug, Clone)]
pub struct BackendMembersService {
    session: Arc<KioskSession>,
}

impl BackendMembersService {
    #[must_use]
    pub fn new(session: Arc<KioskSession>) -> Self {
        Self { session }
    }

    /// A rejected search reads as no results.
    async fn search(&self, query: MemberQuery) -> Result<Vec<MemberRecord>, MembersServiceError> {
        let result = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            let query = query.clone();
            async move { backend.search_members(&token, &query).await }
        })
        .await;

        match result {
            Ok(records) => Ok(records),
            Err(CallError::Backend(BackendError::Rejected(reason))) => {
                warn!(%reason, "member search rejected");

                Ok(Vec::new())
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[async_trait]
impl MembersService for BackendMembersService {
    async fn search_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Vec<MemberSummary>, MembersServiceError> {
        if fingerprint.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records = self
            .search(MemberQuery::CardFingerprint(fingerprint.to_string()))
            .await?;

        Ok(records.iter().map(summary_from_record).collect())
    }

    async fn search_by_contact(
        &self,
        term: &str,
    ) -> Result<Vec<(MemberSummary, ContactMatch)>, MembersServiceError> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records = self.search(MemberQuery::Name(term.to_string())).await?;

        Ok(records
            .iter()
            .map(summary_from_record)
            .filter_map(|summary| {
                let matched = summary.contact_match(term)?;

                Some((summary, matched))
            })
            .collect())
    }

    async fn register(&self, member: NewMember) -> Result<MemberId, MembersServiceError> {
        member.validate()?;

        let request = request_from_member(&member);

        let id = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            let request = request.clone();
            async move { backend.create_member(&token, &request).await }
        })
        .await?;

        info!(member = %id, "member registered");

        Ok(id)
    }
}

#[automock]
#[async_trait]
pub trait MembersService: Send + Sync {
    /// Members who have paid with this card before.
    async fn search_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Vec<MemberSummary>, MembersServiceError>;

    /// Members whose email or phone equals `term`, with the field that matched.
    async fn search_by_contact(
        &self,
        term: &str,
    ) -> Result<Vec<(MemberSummary, ContactMatch)>, MembersServiceError>;

    /// Validate the form and create the member.
    async fn register(&self, member: NewMember) -> Result<MemberId, MembersServiceError>;
}
