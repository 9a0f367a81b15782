//! Kiosk Backend
//!
//! Every remote call the kiosk makes. Implementations must map HTTP 403 to
//! [`BackendError::Unauthorized`]; that is the only signal the session layer
//! reacts to when refreshing tokens.

use async_trait::async_trait;
use kiosk::{
    ids::{AccountId, GroupId, MemberId},
    payments::PaymentIntentId,
};
use mockall::automock;

use crate::session::{AccessToken, OperatorPin};

mod errors;
pub mod http;
pub mod models;

pub use errors::*;
pub use http::{HttpBackend, HttpBackendConfig};
pub use models::*;

/// Remote operations used by the kiosk.
#[automock]
#[async_trait]
pub trait KioskBackend: Send + Sync {
    /// Exchange the operator PIN for an access token.
    async fn exchange_pin(&self, pin: &OperatorPin) -> Result<TokenGrant, BackendError>;

    /// Card readers paired with the tenant.
    async fn list_readers(&self, token: &AccessToken) -> Result<Vec<Reader>, BackendError>;

    /// Placeholder and anonymous member ids.
    async fn default_member_ids(
        &self,
        token: &AccessToken,
    ) -> Result<DefaultMemberIds, BackendError>;

    /// Tenant branding.
    async fn settings(&self, token: &AccessToken) -> Result<SettingsRecord, BackendError>;

    /// Donation categories.
    async fn account_groups(&self, token: &AccessToken) -> Result<GroupListing, BackendError>;

    /// Accounts in one category.
    async fn group_accounts(
        &self,
        token: &AccessToken,
        group: GroupId,
    ) -> Result<Vec<AccountRecord>, BackendError>;

    /// Closure periods for an alert account.
    async fn blocked_days(
        &self,
        token: &AccessToken,
        account: AccountId,
    ) -> Result<Vec<BlockedDaysRecord>, BackendError>;

    /// Member lookup.
    async fn search_members(
        &self,
        token: &AccessToken,
        query: &MemberQuery,
    ) -> Result<Vec<MemberRecord>, BackendError>;

    /// Member registration; returns the new member id.
    async fn create_member(
        &self,
        token: &AccessToken,
        member: &NewMemberRequest,
    ) -> Result<MemberId, BackendError>;

    /// Start a card-present payment on a reader.
    async fn initiate_payment(
        &self,
        token: &AccessToken,
        request: &InitiatePaymentRequest,
    ) -> Result<PaymentInitiation, BackendError>;

    /// Poll an intent.
    async fn payment_status(
        &self,
        token: &AccessToken,
        intent: &PaymentIntentId,
    ) -> Result<PaymentStatusRecord, BackendError>;

    /// Ask the reader to abandon an intent. Returns whether it was cancelled.
    async fn cancel_payment(
        &self,
        token: &AccessToken,
        request: &CancelPaymentRequest,
    ) -> Result<bool, BackendError>;

    /// Record one cart line as a payment.
    async fn create_payment(
        &self,
        token: &AccessToken,
        request: &NewPaymentRequest,
    ) -> Result<CreatedPaymentRecord, BackendError>;

    /// Reassign a recorded payment. Any non-403 reply is returned as-is.
    async fn move_donation(
        &self,
        token: &AccessToken,
        request: &MoveDonationRequest,
    ) -> Result<MoveDonationReply, BackendError>;
}
