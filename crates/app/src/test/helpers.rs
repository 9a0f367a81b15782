//! Test Helpers

use jiff::civil::Date;
use kiosk::{
    accounts::DonationAccount,
    alerts::SchedulingMetadata,
    cart::{Cart, NewLineItem},
    ids::{AccountId, PaymentId},
};
use rust_decimal::Decimal;

use crate::backend::{
    CardPresent, CreatedPaymentRecord, PaymentMethod, PaymentStatusRecord,
};

pub(crate) fn amount_account(id: u64, name: &str) -> DonationAccount {
    DonationAccount {
        id: AccountId::new(id),
        name: name.to_string(),
        fee: None,
        is_alert: false,
        is_tax_deductible: true,
        notes: String::new(),
        schedule: SchedulingMetadata::default(),
    }
}

pub(crate) fn alert_account(id: u64, name: &str, fee: Decimal) -> DonationAccount {
    DonationAccount {
        fee: Some(fee),
        is_alert: true,
        ..amount_account(id, name)
    }
}

/// A cart of amount lines, one per `(account id, name, amount)`.
pub(crate) fn cart_of(lines: &[(u64, &str, i64)]) -> Cart {
    let mut cart = Cart::default();

    for &(id, name, amount) in lines {
        cart.add_item(NewLineItem::from_account(
            &amount_account(id, name),
            Decimal::from(amount),
            None,
        ));
    }

    cart
}

pub(crate) fn add_alert(cart: &mut Cart, id: u64, name: &str, fee: i64, date: Date) {
    cart.add_item(NewLineItem::from_account(
        &alert_account(id, name, Decimal::from(fee)),
        Decimal::ZERO,
        Some(date),
    ));
}

pub(crate) fn status(payment_status: &str) -> PaymentStatusRecord {
    PaymentStatusRecord {
        payment_status: Some(payment_status.to_string()),
        error: None,
        payment_charge_id: None,
        payment_method: None,
    }
}

pub(crate) fn succeeded_status() -> PaymentStatusRecord {
    PaymentStatusRecord {
        payment_charge_id: Some("ch_3Nx".to_string()),
        payment_method: Some(PaymentMethod {
            card_present: Some(CardPresent {
                brand: Some("visa".to_string()),
                last4: Some("4242".to_string()),
                fingerprint: Some("fp_abc".to_string()),
            }),
        }),
        ..status("succeeded")
    }
}

pub(crate) fn failed_status(message: &str) -> PaymentStatusRecord {
    PaymentStatusRecord {
        error: Some(message.to_string()),
        ..status("failed")
    }
}

pub(crate) fn created(id: u64) -> CreatedPaymentRecord {
    CreatedPaymentRecord {
        status: 1,
        id: Some(PaymentId::new(id)),
        message: None,
    }
}

pub(crate) fn not_created(message: &str) -> CreatedPaymentRecord {
    CreatedPaymentRecord {
        status: 0,
        id: None,
        message: Some(message.to_string()),
    }
}
