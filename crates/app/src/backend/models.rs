//! Backend wire models.

use std::fmt::{Display, Formatter, Result as FmtResult};

use kiosk::{
    ids::{AccountId, MemberId, PaymentId},
    payments::PaymentIntentId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::session::AccessToken;

/// Standard `{ status, data }` response wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub(crate) status: i64,

    pub(crate) data: Option<T>,

    #[serde(default)]
    pub(crate) error: Option<Value>,

    #[serde(default)]
    pub(crate) detail: Option<Value>,
}

impl<T> Envelope<T> {
    /// Message explaining a rejected envelope.
    pub(crate) fn failure_message(&self) -> String {
        self.error
            .as_ref()
            .or(self.detail.as_ref())
            .map_or_else(|| format!("status {}", self.status), value_message)
    }
}

/// Render a JSON value as an operator-readable message.
pub(crate) fn value_message(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Result of exchanging the operator PIN for a token.
#[derive(Debug, Default)]
pub struct TokenGrant {
    /// Issued token, when the exchange succeeded.
    pub access_token: Option<AccessToken>,

    /// Backend-supplied failure reason.
    pub error: Option<String>,
}

/// A card reader paired with the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reader {
    /// Backend id.
    pub id: u64,

    /// Name used to address the reader in payment calls.
    pub name: String,

    /// Processor-side reader id.
    #[serde(default)]
    pub reader_id: String,
}

/// A member id that the backend may send as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    /// Numeric form.
    Number(i64),

    /// String form.
    Text(String),
}

impl LooseId {
    /// The member id, or `None` for the `-1` "not configured" marker and
    /// anything unparseable.
    pub fn member_id(&self) -> Option<MemberId> {
        let raw = match self {
            Self::Number(value) => *value,
            Self::Text(value) => value.trim().parse().ok()?,
        };

        u64::try_from(raw).ok().map(MemberId::new)
    }
}

impl Display for LooseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Members that payments are recorded against before attribution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DefaultMemberIds {
    /// Placeholder member for freshly recorded payments.
    pub default_member: LooseId,

    /// Member used for anonymous donations.
    pub anonymous_member: LooseId,
}

/// Tenant branding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsRecord {
    /// Colour theme name.
    #[serde(default)]
    pub theme: Option<String>,

    /// Tenant display name.
    #[serde(default)]
    pub tenant_name: Option<String>,

    /// Tenant logo.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Company wordmark.
    #[serde(default)]
    pub company_name_logo_url: Option<String>,
}

/// Donation category as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupRecord {
    /// Backend id.
    pub sys_id: u64,

    /// Display name.
    pub name: String,

    /// Description.
    #[serde(default)]
    pub description: Option<String>,

    /// Tile image.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// The groups listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupListing {
    /// Real groups.
    #[serde(default)]
    pub groups: Vec<GroupRecord>,

    /// Whether accounts exist outside every group.
    #[serde(default, deserialize_with = "loose_flag")]
    pub other_available: bool,
}

/// Donation account as listed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Backend id.
    #[serde(rename = "sys_id")]
    pub sys_id: u64,

    /// Display name.
    #[serde(rename = "display_name")]
    pub display_name: String,

    /// `1` when donations are tax deductible.
    #[serde(rename = "is_tax_deducible", default, deserialize_with = "loose_flag")]
    pub is_tax_deductible: bool,

    /// `1` for alert accounts.
    #[serde(default, deserialize_with = "loose_flag")]
    pub alert: bool,

    /// Fixed fee.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub fees: Option<Decimal>,

    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,

    /// Comma-separated preset amounts.
    #[serde(default)]
    pub default_values: Option<String>,

    /// Minimum days of notice for alerts.
    #[serde(default)]
    pub advance_notice_days: Option<u32>,

    /// `HH:MM[:SS]` daily cut-off.
    #[serde(default)]
    pub cut_off_time: Option<String>,

    /// Seven `0`/`1` flags from Sunday.
    #[serde(default)]
    pub week_schedule: Option<String>,
}

/// A closure period for an alert account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockedDaysRecord {
    /// Event name.
    #[serde(default)]
    pub name: String,

    /// First blocked day.
    pub start_date: String,

    /// Last blocked day.
    pub end_date: String,
}

/// Member lookup criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberQuery {
    /// Free-text search, usually an email or phone number.
    Name(String),

    /// Card used for the payment just taken.
    CardFingerprint(String),
}

impl MemberQuery {
    /// Query-string pair for the search endpoint.
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            Self::Name(term) => ("name", term),
            Self::CardFingerprint(fingerprint) => ("card_fingerprint", fingerprint),
        }
    }
}

/// A postal address as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Street line.
    #[serde(default)]
    pub address_line: Option<String>,

    /// City
    #[serde(default)]
    pub city: Option<String>,

    /// State
    #[serde(default)]
    pub state: Option<String>,

    /// Country
    #[serde(default)]
    pub country: Option<String>,

    /// Postal code.
    #[serde(default)]
    pub zipcode: Option<String>,
}

/// A member's address books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    /// Home addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub home_address: Vec<AddressRecord>,

    /// Business addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_address: Vec<AddressRecord>,

    /// Billing addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub billing_address: Vec<AddressRecord>,
}

/// A member's contact channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Personal emails.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personal_email: Vec<String>,

    /// Work emails.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_email: Vec<String>,

    /// Home phones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub home_phone: Vec<String>,

    /// Work phones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_phone: Vec<String>,

    /// Mobile phones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cell_phone: Vec<String>,
}

/// A member returned by search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberRecord {
    /// Backend id.
    pub sys_id: u64,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,

    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,

    /// Addresses.
    #[serde(default)]
    pub addresses: AddressBook,

    /// Contact channels.
    #[serde(default)]
    pub contact_details: ContactDetails,
}

/// Member registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMemberRequest {
    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Display name.
    pub display_name: String,

    /// Lower-case gender.
    pub gender: String,

    /// Contact channels.
    pub contact_details: ContactDetails,

    /// Addresses.
    pub addresses: AddressBook,
}

/// Card-present payment request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitiatePaymentRequest {
    /// Reader to drive.
    pub reader_name: String,

    /// Cart total.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// JSON-encoded checkout manifest.
    pub custom_metadata: String,
}

/// Reply to a payment initiation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentInitiation {
    /// Whether the reader accepted the intent.
    #[serde(default)]
    pub payment_intent_created: bool,

    /// Intent to poll.
    #[serde(default)]
    pub payment_intent_id: Option<PaymentIntentId>,
}

/// Card details reported for a card-present charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CardPresent {
    /// Card network.
    #[serde(default)]
    pub brand: Option<String>,

    /// Last four digits.
    #[serde(default)]
    pub last4: Option<String>,

    /// Stable card identifier.
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Payment method block of a status reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentMethod {
    /// Present for card-present charges.
    #[serde(default)]
    pub card_present: Option<CardPresent>,
}

/// Reply to a status poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentStatusRecord {
    /// Raw status string.
    #[serde(default)]
    pub payment_status: Option<String>,

    /// Failure message for declined payments.
    #[serde(default, deserialize_with = "loose_message")]
    pub error: Option<String>,

    /// Processor charge id.
    #[serde(default)]
    pub payment_charge_id: Option<String>,

    /// Card used.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl PaymentStatusRecord {
    /// The card-present block, if any.
    pub fn card(&self) -> Option<&CardPresent> {
        self.payment_method
            .as_ref()
            .and_then(|method| method.card_present.as_ref())
    }
}

/// Cancellation request for an open intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelPaymentRequest {
    /// Reader the intent was sent to.
    pub reader_name: String,

    /// Intent to cancel.
    pub payment_intent_id: PaymentIntentId,
}

/// Payment record for one cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPaymentRequest {
    /// Member the payment is recorded against.
    pub member_id: MemberId,

    /// Account funded.
    pub account_id: AccountId,

    /// Always `credit_card`.
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// Line amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// Masked card, e.g. `[visa ****4242]`.
    pub details: String,

    /// Processor charge id.
    pub stripe_charge_id: String,

    /// Marks records created by the kiosk donation flow.
    pub isdonationflow: bool,

    /// `YYYY-MM-DD`, alert lines only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

/// Payment method type recorded for card-reader payments.
pub const CREDIT_CARD: &str = "credit_card";

/// Reply to a payment record creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPaymentRecord {
    /// Envelope status; `1` is success.
    pub status: i64,

    /// Created record id.
    pub id: Option<PaymentId>,

    /// Failure message.
    pub message: Option<String>,
}

impl CreatedPaymentRecord {
    /// The created id when the backend reported success.
    pub fn created_id(&self) -> Option<PaymentId> {
        if self.status == 1 { self.id } else { None }
    }
}

/// Reassignment of a recorded payment to its donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveDonationRequest {
    /// Target member.
    #[serde(rename = "newDonationMember")]
    pub new_donation_member: MemberId,

    /// Payment to move.
    #[serde(rename = "paymentId")]
    pub payment_id: PaymentId,

    /// Card used, for reconciliation.
    #[serde(rename = "cardFingerprint", skip_serializing_if = "Option::is_none")]
    pub card_fingerprint: Option<String>,
}

/// Raw reply to a move-donation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDonationReply {
    /// HTTP status code.
    pub status: u16,

    /// Decoded body, `Null` when empty or not JSON.
    pub body: Value,
}

impl MoveDonationReply {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Accept `true`/`false`, `0`/`1` or their string forms.
fn loose_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => matches!(text.trim(), "1" | "true"),
        _ => false,
    })
}

/// Accept a string, `null` or any JSON value rendered as text.
fn loose_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(value_message(&other)),
    })
}
