//! Cart
//!
//! The in-session list of pending donations. Lines keep insertion order for
//! display; totals do not depend on it. The cart performs no validation:
//! callers check lines with [`crate::validation`] before adding them.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

mod line_item;

pub use line_item::{CartLineItem, EntryId, LineItemUpdate, NewLineItem};

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<CartLineItem>,
    currency: &'static Currency,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(rusty_money::iso::USD)
    }
}

impl Cart {
    /// Create an empty cart billed in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Append a line, assigning it a fresh [`EntryId`].
    pub fn add_item(&mut self, item: NewLineItem) -> EntryId {
        let entry_id = EntryId::new();

        self.items.push(CartLineItem::from_new(entry_id, item));

        entry_id
    }

    /// Replace the given fields on the matching line. Unknown entries are ignored.
    pub fn update_item(&mut self, entry_id: EntryId, update: LineItemUpdate) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.entry_id() == entry_id)
        {
            item.apply(update);
        }
    }

    /// Remove the matching line. Unknown entries are ignored.
    pub fn remove_item(&mut self, entry_id: EntryId) {
        self.items.retain(|item| item.entry_id() != entry_id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all line amounts; zero for an empty cart.
    pub fn total_amount(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |total, item| {
                total.checked_add(item.amount()).unwrap_or(total)
            })
    }

    /// The total as money in the cart currency.
    pub fn total(&self) -> Money<'static, Currency> {
        Money::from_decimal(self.total_amount(), self.currency)
    }

    /// Whether a card payment may be started: at least one line and a positive total.
    pub fn is_checkout_ready(&self) -> bool {
        !self.is_empty() && self.total_amount() > Decimal::ZERO
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up a line by entry id.
    pub fn get(&self, entry_id: EntryId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.entry_id() == entry_id)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The cart currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use jiff::civil::date;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{alerts::SchedulingMetadata, ids::AccountId};

    use super::*;

    fn line(account: u64, amount: i64) -> NewLineItem {
        NewLineItem {
            account_id: AccountId::new(account),
            name: format!("Account {account}"),
            amount: Decimal::from(amount),
            is_alert: false,
            alert_date: None,
            schedule: SchedulingMetadata::default(),
        }
    }

    fn sum(cart: &Cart) -> Decimal {
        cart.items().iter().map(CartLineItem::amount).sum()
    }

    #[test]
    fn empty_cart_totals_zero() {
        let cart = Cart::default();

        assert_eq!(cart.total_amount(), Decimal::ZERO);
        assert_eq!(cart.total(), Money::from_minor(0, iso::USD));
        assert!(!cart.is_checkout_ready());
    }

    #[test]
    fn total_tracks_every_mutation() -> TestResult {
        let mut cart = Cart::new(iso::USD);

        let a = cart.add_item(line(1, 10));
        assert_eq!(cart.total_amount(), sum(&cart));

        let b = cart.add_item(line(2, 20));
        cart.add_item(line(3, 30));
        assert_eq!(cart.total_amount(), Decimal::from(60));

        cart.update_item(
            b,
            LineItemUpdate {
                amount: Some(Decimal::new(2550, 2)),
                alert_date: None,
            },
        );
        assert_eq!(cart.total_amount(), sum(&cart));
        assert_eq!(cart.total_amount(), Decimal::new(6550, 2));

        cart.remove_item(a);
        assert_eq!(cart.total_amount(), sum(&cart));
        assert_eq!(cart.len(), 2);

        cart.clear();
        assert_eq!(cart.total_amount(), Decimal::ZERO);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn same_account_added_twice_gets_distinct_entries() {
        let mut cart = Cart::default();

        let entries: HashSet<EntryId> = (0..25).map(|_| cart.add_item(line(7, 5))).collect();

        assert_eq!(entries.len(), 25, "every add must yield a new entry id");
        assert_eq!(cart.len(), 25);
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut cart = Cart::default();

        cart.add_item(line(1, 10));
        cart.add_item(line(2, 20));
        cart.add_item(line(3, 30));

        let accounts: Vec<u64> = cart.items().iter().map(|i| i.account_id().get()).collect();

        assert_eq!(accounts, vec![1, 2, 3]);
    }

    #[test]
    fn unknown_entries_are_ignored() {
        let mut cart = Cart::default();
        cart.add_item(line(1, 10));

        let stranger = EntryId::new();

        cart.update_item(
            stranger,
            LineItemUpdate {
                amount: Some(Decimal::from(99)),
                alert_date: None,
            },
        );
        cart.remove_item(stranger);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_amount(), Decimal::from(10));
    }

    #[test]
    fn update_sets_alert_date_and_keeps_other_fields() -> TestResult {
        let mut cart = Cart::default();

        let entry = cart.add_item(NewLineItem {
            is_alert: true,
            ..line(4, 51)
        });

        cart.update_item(
            entry,
            LineItemUpdate {
                amount: None,
                alert_date: Some(date(2025, 3, 5)),
            },
        );

        let item = cart.get(entry).ok_or("line should still exist")?;

        assert_eq!(item.alert_date(), Some(date(2025, 3, 5)));
        assert_eq!(item.amount(), Decimal::from(51));
        assert_eq!(item.name(), "Account 4");

        Ok(())
    }

    #[test]
    fn checkout_requires_positive_total() {
        let mut cart = Cart::default();

        cart.add_item(line(1, 0));
        assert!(!cart.is_checkout_ready(), "zero total");

        cart.add_item(line(2, 5));
        assert!(cart.is_checkout_ready());
    }
}
