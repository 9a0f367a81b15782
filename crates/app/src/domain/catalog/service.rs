//! Catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use kiosk::{
    accounts::{AccountGroup, DonationAccount},
    alerts::BlockedRange,
    ids::{AccountId, GroupId},
};
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    domain::catalog::{
        errors::CatalogServiceError,
        records::{account_from_record, blocked_range_from_record, group_from_record},
    },
    session::{KioskSession, with_reauth},
};

#[derive(Debug, Clone)]
pub struct BackendCatalogService {
    session: Arc<KioskSession>,
}

impl BackendCatalogService {
    #[must_use]
    pub fn new(session: Arc<KioskSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CatalogService for BackendCatalogService {
    async fn list_groups(&self) -> Result<Vec<AccountGroup>, CatalogServiceError> {
        let listing = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            async move { backend.account_groups(&token).await }
        })
        .await?;

        let mut groups: Vec<AccountGroup> =
            listing.groups.into_iter().map(group_from_record).collect();

        if listing.other_available {
            groups.push(AccountGroup::others());
        }

        debug!(count = groups.len(), "loaded account groups");

        Ok(groups)
    }

    async fn list_accounts(
        &self,
        group: GroupId,
    ) -> Result<Vec<DonationAccount>, CatalogServiceError> {
        let records = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            async move { backend.group_accounts(&token, group).await }
        })
        .await?;

        debug!(%group, count = records.len(), "loaded group accounts");

        Ok(records.into_iter().map(account_from_record).collect())
    }

    async fn blocked_ranges(
        &self,
        account: AccountId,
    ) -> Result<Vec<BlockedRange>, CatalogServiceError> {
        let records = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            async move { backend.blocked_days(&token, account).await }
        })
        .await?;

        Ok(records.iter().filter_map(blocked_range_from_record).collect())
    }

    async fn account_index(
        &self,
    ) -> Result<FxHashMap<AccountId, DonationAccount>, CatalogServiceError> {
        let mut index = FxHashMap::default();

        for group in self.list_groups().await? {
            for account in self.list_accounts(group.id).await? {
                index.entry(account.id).or_insert(account);
            }
        }

        Ok(index)
    }

    async fn find_account(
        &self,
        account: AccountId,
    ) -> Result<DonationAccount, CatalogServiceError> {
        self.account_index()
            .await?
            .remove(&account)
            .ok_or(CatalogServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Donation categories, with the "Others" group last when ungrouped accounts exist.
    async fn list_groups(&self) -> Result<Vec<AccountGroup>, CatalogServiceError>;

    /// Accounts in one category.
    async fn list_accounts(&self, group: GroupId)
    -> Result<Vec<DonationAccount>, CatalogServiceError>;

    /// Closure periods of an alert account.
    async fn blocked_ranges(
        &self,
        account: AccountId,
    ) -> Result<Vec<BlockedRange>, CatalogServiceError>;

    /// Every account across every group, keyed by id.
    async fn account_index(
        &self,
    ) -> Result<FxHashMap<AccountId, DonationAccount>, CatalogServiceError>;

    /// Look an account up by id across every group.
    async fn find_account(&self, account: AccountId)
    -> Result<DonationAccount, CatalogServiceError>;
}
