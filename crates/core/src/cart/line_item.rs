//! Cart Line Items

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::{
    accounts::DonationAccount,
    alerts::{SchedulingMetadata, format_alert_date},
    ids::AccountId,
    uuids::TypedUuid,
};

/// Identifier assigned to a line when it enters the cart.
///
/// Never derived from the account id: the same account can appear on several lines.
pub type EntryId = TypedUuid<CartLineItem>;

/// A pending donation in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    entry_id: EntryId,
    account_id: AccountId,
    name: String,
    amount: Decimal,
    is_alert: bool,
    alert_date: Option<Date>,
    schedule: SchedulingMetadata,
}

impl CartLineItem {
    pub(crate) fn from_new(entry_id: EntryId, item: NewLineItem) -> Self {
        Self {
            entry_id,
            account_id: item.account_id,
            name: item.name,
            amount: item.amount,
            is_alert: item.is_alert,
            alert_date: item.alert_date,
            schedule: item.schedule,
        }
    }

    pub(crate) fn apply(&mut self, update: LineItemUpdate) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }

        if let Some(alert_date) = update.alert_date {
            self.alert_date = Some(alert_date);
        }
    }

    /// Cart-assigned identifier.
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    /// The account this line funds.
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Display label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line amount.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Whether this is a scheduled alert line.
    pub fn is_alert(&self) -> bool {
        self.is_alert
    }

    /// Scheduled date of an alert line.
    pub fn alert_date(&self) -> Option<Date> {
        self.alert_date
    }

    /// Scheduling metadata copied from the catalog account.
    pub fn schedule(&self) -> &SchedulingMetadata {
        &self.schedule
    }

    /// The alert date as `YYYY-MM-DD`, only for alert lines that have one.
    pub fn formatted_alert_date(&self) -> Option<String> {
        if !self.is_alert {
            return None;
        }

        self.alert_date.map(format_alert_date)
    }

    /// Whether the line can be paid for: alert lines need a date, others a
    /// positive amount.
    pub fn is_complete(&self) -> bool {
        if self.is_alert {
            self.alert_date.is_some()
        } else {
            self.amount > Decimal::ZERO
        }
    }
}

/// A line about to be added to the cart; the cart assigns its [`EntryId`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    /// The account this line funds.
    pub account_id: AccountId,

    /// Display label.
    pub name: String,

    /// Line amount.
    pub amount: Decimal,

    /// Whether this is a scheduled alert line.
    pub is_alert: bool,

    /// Scheduled date; must be `None` for non-alert lines.
    pub alert_date: Option<Date>,

    /// Scheduling metadata copied from the catalog account.
    pub schedule: SchedulingMetadata,
}

impl NewLineItem {
    /// Build a line for `account`.
    ///
    /// Alert accounts bill their fixed fee and keep `alert_date`; other
    /// accounts bill `entered_amount` and never carry a date.
    #[must_use]
    pub fn from_account(
        account: &DonationAccount,
        entered_amount: Decimal,
        alert_date: Option<Date>,
    ) -> Self {
        let (amount, alert_date) = if account.is_alert {
            (account.alert_fee(), alert_date)
        } else {
            (entered_amount, None)
        };

        Self {
            account_id: account.id,
            name: account.name.clone(),
            amount,
            is_alert: account.is_alert,
            alert_date,
            schedule: account.schedule.clone(),
        }
    }
}

/// Fields replaced by an edit. `None` leaves the current value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemUpdate {
    /// New amount.
    pub amount: Option<Decimal>,

    /// New alert date.
    pub alert_date: Option<Date>,
}
