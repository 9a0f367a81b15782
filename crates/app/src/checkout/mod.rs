//! Checkout
//!
//! Taking a card-present payment for the whole cart and turning it into
//! backend payment records:
//!
//! 1. [`CardReaderCheckout`] starts a payment intent on the selected reader
//!    and polls it until it succeeds, fails or the operator cancels.
//! 2. [`PaymentSubmissionPipeline`] records one payment per cart line against
//!    the placeholder member, strictly in cart order.
//! 3. [`DonationAttribution`] moves the recorded payments to the donor (or
//!    the anonymous member) once the operator has picked one.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use kiosk::{ids::PaymentId, payments::CardDescriptor};
use thiserror::Error;

use crate::{backend::BackendError, session::SessionError};

mod attribution;
mod observer;
mod orchestrator;
mod submission;

pub use attribution::{AttributionResult, DonationAttribution, SESSION_EXPIRED_MESSAGE};
pub use observer::{CheckoutObserver, NoopObserver};
pub use orchestrator::{
    CANCEL_FAILED_MESSAGE, CANCELLED_MESSAGE, CANCELLING_MESSAGE, CardReaderCheckout,
    PENDING_MESSAGE, THANKS_MESSAGE,
};
pub use submission::{
    PaymentMetadata, PaymentSubmissionPipeline, SubmissionReport, SubmissionResult,
};

/// Errors that end a checkout before the card reader has an outcome.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The session is missing something the checkout needs.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The token could not be renewed; the operator must log in again.
    #[error("log in again")]
    ReauthRequired,

    /// The cart manifest could not be encoded.
    #[error("failed to encode checkout manifest")]
    Manifest(#[source] serde_json::Error),

    /// The backend refused to start the payment.
    #[error("failed to start card payment")]
    Backend(#[source] BackendError),
}

/// Where a checkout attempt is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Initiating,
    AwaitingReader,
    Succeeded,
    Failed,
    CancelRequested,
    Cancelling,
    CanceledConfirmed,
    CancelFailedStillPending,
}

/// Delays applied by [`CardReaderCheckout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTimings {
    /// Pause between a status response and the next status request.
    pub poll_delay: Duration,

    /// How long a failure stays on screen before returning to idle.
    pub failure_dwell: Duration,

    /// How long a cancellation confirmation stays on screen.
    pub cancel_dwell: Duration,
}

impl CheckoutTimings {
    /// No delays at all.
    pub const fn immediate() -> Self {
        Self {
            poll_delay: Duration::ZERO,
            failure_dwell: Duration::ZERO,
            cancel_dwell: Duration::ZERO,
        }
    }
}

impl Default for CheckoutTimings {
    fn default() -> Self {
        Self {
            poll_delay: Duration::from_millis(500),
            failure_dwell: Duration::from_secs(1),
            cancel_dwell: Duration::from_secs(2),
        }
    }
}

/// Create a linked cancel handle and signal.
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let flag = Arc::new(AtomicBool::new(false));

    (CancelHandle(Arc::clone(&flag)), CancelSignal(flag))
}

/// Operator side of a cancellation: asks the running checkout to cancel.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation. Picked up before the next status poll.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Checkout side of a cancellation.
#[derive(Debug, Clone)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    /// Consume a pending request, if any.
    pub fn take_request(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// How a checkout attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The cart was empty or totalled zero; nothing was sent.
    NotStarted,

    /// The card was charged and the cart lines were recorded.
    Completed(CompletedCheckout),

    /// The reader or backend reported a failure.
    Failed {
        /// Operator-facing reason.
        message: String,
    },

    /// The operator cancelled and the backend confirmed it.
    Canceled,
}

/// A charged card and the payment records created for it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCheckout {
    /// Processor charge id.
    pub charge_id: String,

    /// Masked card.
    pub card: CardDescriptor,

    /// Stable card identifier used to find returning donors.
    pub card_fingerprint: Option<String>,

    /// One result per cart line.
    pub submissions: SubmissionReport,
}

impl CompletedCheckout {
    /// Ids of the payment records that were created, in cart order.
    pub fn payment_ids(&self) -> Vec<PaymentId> {
        self.submissions.payment_ids()
    }
}
