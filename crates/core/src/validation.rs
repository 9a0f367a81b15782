//! Input Validation
//!
//! Checks run before anything reaches the cart or the backend. Failures are
//! shown to the operator as short-lived inline notices.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;

use crate::accounts::DonationAccount;

/// Number of digits in an operator PIN.
pub const PIN_LENGTH: usize = 6;

/// How long cart-item notices stay on screen.
pub const ITEM_NOTICE_TTL: SignedDuration = SignedDuration::from_secs(3);

/// How long login and registration form notices stay on screen.
pub const FORM_NOTICE_TTL: SignedDuration = SignedDuration::from_secs(2);

/// A single rejected input.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Non-alert amount missing or not positive.
    #[error("Please Enter the amount")]
    InvalidAmount,

    /// Alert line without a date.
    #[error("Please select the date.")]
    MissingAlertDate,

    /// PIN is not exactly six digits.
    #[error("Please enter all 6 digits.")]
    IncompletePin,

    /// Registration form without a first name.
    #[error("First name is required.")]
    MissingFirstName,

    /// Registration form without a last name.
    #[error("Last name is required.")]
    MissingLastName,

    /// Registration form email blank or malformed.
    #[error("Valid email is required.")]
    InvalidEmail,

    /// Registration form phone blank or too short.
    #[error("Valid phone number is required.")]
    InvalidPhone,
}

impl ValidationError {
    /// How long the notice for this error should be displayed.
    pub fn notice_ttl(self) -> SignedDuration {
        match self {
            Self::InvalidAmount | Self::MissingAlertDate => ITEM_NOTICE_TTL,
            Self::IncompletePin
            | Self::MissingFirstName
            | Self::MissingLastName
            | Self::InvalidEmail
            | Self::InvalidPhone => FORM_NOTICE_TTL,
        }
    }
}

/// Every failing field of a form, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(SmallVec<[ValidationError; 4]>);

impl ValidationErrors {
    /// Record a failure.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Whether nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `error` was recorded.
    pub fn contains(&self, error: ValidationError) -> bool {
        self.0.contains(&error)
    }

    /// The recorded failures, in field order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// `Ok` when nothing failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut first = true;

        for error in &self.0 {
            if !first {
                f.write_str(" ")?;
            }

            first = false;

            Display::fmt(error, f)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::default();

        errors.push(error);

        errors
    }
}

/// Check an operator's entry for `account` before it is added to the cart.
///
/// # Errors
///
/// - [`ValidationError::MissingAlertDate`] for alert accounts without a date.
/// - [`ValidationError::InvalidAmount`] for other accounts without a positive amount.
pub fn validate_line_item(
    account: &DonationAccount,
    amount: Option<Decimal>,
    has_alert_date: bool,
) -> Result<(), ValidationError> {
    if account.is_alert {
        if has_alert_date {
            return Ok(());
        }

        return Err(ValidationError::MissingAlertDate);
    }

    match amount {
        Some(amount) if amount > Decimal::ZERO => Ok(()),
        _ => Err(ValidationError::InvalidAmount),
    }
}

/// Check that `pin` is exactly six ASCII digits.
///
/// # Errors
///
/// Returns [`ValidationError::IncompletePin`] otherwise.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::IncompletePin)
    }
}

/// Transient inline message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text shown to the operator.
    pub message: String,

    /// When the notice disappears.
    pub expires_at: Timestamp,
}

impl Notice {
    /// Notice for `error`, raised at `now`.
    pub fn for_error(error: ValidationError, now: Timestamp) -> Self {
        Self::new(error.to_string(), now, error.notice_ttl())
    }

    /// Notice with an explicit lifetime. Saturates at the end of time.
    pub fn new(message: impl Into<String>, now: Timestamp, ttl: SignedDuration) -> Self {
        Self {
            message: message.into(),
            expires_at: now.checked_add(ttl).unwrap_or(Timestamp::MAX),
        }
    }

    /// Whether the notice should still be displayed at `now`.
    pub fn is_visible(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}
