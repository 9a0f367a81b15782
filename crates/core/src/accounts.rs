//! Donation Accounts

use rust_decimal::Decimal;

use crate::{
    alerts::SchedulingMetadata,
    ids::{AccountId, GroupId},
};

/// Id of the pseudo-group listing accounts that belong to no real group.
pub const OTHERS_GROUP_ID: GroupId = GroupId::new(0);

/// A donation category shown on the account selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountGroup {
    /// Backend id.
    pub id: GroupId,

    /// Display name.
    pub name: String,

    /// Short description shown under the name.
    pub description: String,

    /// Optional tile image.
    pub image_url: Option<String>,
}

impl AccountGroup {
    /// The "Others" group offered when the catalog reports ungrouped accounts.
    #[must_use]
    pub fn others() -> Self {
        Self {
            id: OTHERS_GROUP_ID,
            name: "Others".to_string(),
            description: String::new(),
            image_url: None,
        }
    }
}

/// A fundable account within a group.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationAccount {
    /// Backend id.
    pub id: AccountId,

    /// Display name.
    pub name: String,

    /// Fixed fee, when the account has one.
    pub fee: Option<Decimal>,

    /// Alert accounts bill a fixed fee on a scheduled date.
    pub is_alert: bool,

    /// Whether donations to this account are tax deductible.
    pub is_tax_deductible: bool,

    /// Free-form notes from the catalog.
    pub notes: String,

    /// Date-picking and keypad metadata.
    pub schedule: SchedulingMetadata,
}

impl DonationAccount {
    /// The amount billed for an alert line: the fixed fee, or zero when none is set.
    #[must_use]
    pub fn alert_fee(&self) -> Decimal {
        self.fee.unwrap_or(Decimal::ZERO)
    }
}
