//! Card Payments

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Correlation id of one card-present payment attempt on the reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentIntentId(String);

impl PaymentIntentId {
    /// Wrap a backend-issued intent id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PaymentIntentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Not yet resolved on the reader.
    Pending,

    /// Charge captured.
    Succeeded,

    /// The reader or processor declined the payment.
    Failed,

    /// Cancelled by the operator.
    Canceled,
}

impl PaymentStatus {
    /// Map a backend status string. Only `succeeded` and `failed` are terminal
    /// while polling; anything else is still pending.
    pub fn from_wire(value: &str) -> Self {
        match value.trim() {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Whether polling should stop.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Correlation state for one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCardPayment {
    /// Intent being polled.
    pub intent_id: PaymentIntentId,

    /// Last observed status.
    pub status: PaymentStatus,
}

impl PendingCardPayment {
    /// Start tracking a freshly created intent.
    pub fn new(intent_id: PaymentIntentId) -> Self {
        Self {
            intent_id,
            status: PaymentStatus::Pending,
        }
    }
}

/// Masked card shown on receipts and stored on payment records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardDescriptor {
    /// Card network, e.g. `visa`.
    pub brand: String,

    /// Last four digits.
    pub last4: String,
}

impl Display for CardDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{} ****{}]", self.brand, self.last4)
    }
}
