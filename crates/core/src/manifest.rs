//! Checkout Manifest
//!
//! Per-line summary attached to a card payment request so the backend can
//! reconcile the charge against what the operator rang up.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// One cart line as recorded on the payment intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Line display name.
    pub name: String,

    /// `YYYY-MM-DD` for alert lines, otherwise null.
    #[serde(rename = "alertDate")]
    pub alert_date: Option<String>,

    /// Line amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Build the manifest for every line in the cart, in cart order.
#[must_use]
pub fn checkout_manifest(cart: &Cart) -> Vec<ManifestEntry> {
    cart.items()
        .iter()
        .map(|item| ManifestEntry {
            name: item.name().to_string(),
            alert_date: item.formatted_alert_date(),
            amount: item.amount(),
        })
        .collect()
}

/// Serialize the manifest into the string carried as payment metadata.
///
/// # Errors
///
/// Returns an error if the manifest cannot be serialized.
pub fn encode_manifest(entries: &[ManifestEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(entries)
}
