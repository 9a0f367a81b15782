//! Card-Reader Checkout
//!
//! One checkout attempt is a small state machine:
//!
//! ```text
//! Idle -> Initiating -> AwaitingReader -> Succeeded
//!                                      -> Failed -> Idle
//!                                      -> CancelRequested -> Cancelling -> CanceledConfirmed -> Idle
//!                                                                       -> CancelFailedStillPending -> AwaitingReader
//! ```
//!
//! Status polls never overlap: the next poll is only sent once the previous
//! response has been handled. A pending cancellation is sent in place of the
//! next poll.

use std::{sync::Arc, time::Duration};

use kiosk::{
    cart::Cart,
    ids::MemberId,
    manifest::{checkout_manifest, encode_manifest},
    payments::{CardDescriptor, PaymentStatus, PendingCardPayment},
};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    backend::{CancelPaymentRequest, InitiatePaymentRequest, PaymentStatusRecord},
    checkout::{
        CancelSignal, CheckoutError, CheckoutObserver, CheckoutOutcome, CheckoutState,
        CheckoutTimings, CompletedCheckout, PaymentMetadata, PaymentSubmissionPipeline,
    },
    session::{CallError, KioskSession, with_reauth},
};

pub const PENDING_MESSAGE: &str = "Payment is pending. Please pay and hold.";
pub const CANCELLING_MESSAGE: &str = "Trying to cancel the payment. Please hold.";
pub const CANCEL_FAILED_MESSAGE: &str = "Error occurred while cancelling the payment.";
pub const CANCELLED_MESSAGE: &str = "Payment Cancelled Successfully.";
pub const THANKS_MESSAGE: &str = "Thanks for your donation.";

const NOT_CREATED_MESSAGE: &str = "The card reader could not start the payment.";
const DECLINED_MESSAGE: &str = "Payment failed.";

fn checkout_error(error: CallError) -> CheckoutError {
    match error {
        CallError::Backend(source) => CheckoutError::Backend(source),
        CallError::ReauthRequired | CallError::SessionExpired(_) => CheckoutError::ReauthRequired,
    }
}

fn card_from_record(record: &PaymentStatusRecord) -> (CardDescriptor, Option<String>) {
    let Some(card) = record.card() else {
        return (CardDescriptor::default(), None);
    };

    let descriptor = CardDescriptor {
        brand: card.brand.clone().unwrap_or_default(),
        last4: card.last4.clone().unwrap_or_default(),
    };

    let fingerprint = card
        .fingerprint
        .clone()
        .filter(|fingerprint| !fingerprint.is_empty());

    (descriptor, fingerprint)
}

/// Takes a card-present payment for a cart and records its lines.
#[derive(Debug, Clone)]
pub struct CardReaderCheckout {
    session: Arc<KioskSession>,
    submissions: PaymentSubmissionPipeline,
    timings: CheckoutTimings,
}

impl CardReaderCheckout {
    pub fn new(session: Arc<KioskSession>, timings: CheckoutTimings) -> Self {
        Self {
            submissions: PaymentSubmissionPipeline::new(Arc::clone(&session)),
            session,
            timings,
        }
    }

    /// Run one checkout attempt for `cart`.
    ///
    /// Returns [`CheckoutOutcome::NotStarted`] without contacting the backend
    /// when the cart is empty or totals zero. On success every line is
    /// recorded against the default member; attributing the payments to the
    /// donor is left to the caller. The cart is not modified.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Session`] if no reader or default members are set.
    /// - [`CheckoutError::ReauthRequired`] if the token cannot be renewed.
    /// - [`CheckoutError::Backend`] if the payment cannot be started.
    pub async fn run<O>(
        &self,
        cart: &Cart,
        cancel: &CancelSignal,
        observer: &mut O,
    ) -> Result<CheckoutOutcome, CheckoutError>
    where
        O: CheckoutObserver + ?Sized,
    {
        if !cart.is_checkout_ready() {
            return Ok(CheckoutOutcome::NotStarted);
        }

        let reader_name = self.session.reader_name().await?;
        let default_member = self.session.default_members().await?.default_member;

        observer.on_state(CheckoutState::Initiating);
        observer.on_message(PENDING_MESSAGE);

        let manifest =
            encode_manifest(&checkout_manifest(cart)).map_err(CheckoutError::Manifest)?;

        let request = InitiatePaymentRequest {
            reader_name: reader_name.clone(),
            amount: cart.total_amount(),
            custom_metadata: manifest,
        };

        let initiation = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            let request = request.clone();
            async move { backend.initiate_payment(&token, &request).await }
        })
        .await
        .map_err(checkout_error)?;

        let intent_id = match initiation.payment_intent_id {
            Some(intent_id) if initiation.payment_intent_created => intent_id,
            _ => {
                error!(reader = %reader_name, "payment intent was not created");

                return Ok(self.fail(NOT_CREATED_MESSAGE.to_string(), observer).await);
            }
        };

        info!(intent = %intent_id, amount = %request.amount, "payment intent created");

        let mut pending = PendingCardPayment::new(intent_id);

        observer.on_state(CheckoutState::AwaitingReader);

        loop {
            if cancel.take_request() && self.cancel(&reader_name, &mut pending, observer).await? {
                return Ok(CheckoutOutcome::Canceled);
            }

            let polled = with_reauth(&self.session, |token| {
                let backend = self.session.backend();
                let intent_id = pending.intent_id.clone();
                async move { backend.payment_status(&token, &intent_id).await }
            })
            .await;

            match polled {
                Ok(record) => {
                    let wire_status = record.payment_status.as_deref().unwrap_or_default();

                    pending.status = PaymentStatus::from_wire(wire_status);

                    match pending.status {
                        PaymentStatus::Succeeded => {
                            return Ok(self
                                .complete(cart, &record, default_member, observer)
                                .await);
                        }
                        PaymentStatus::Failed => {
                            let message = record
                                .error
                                .filter(|message| !message.is_empty())
                                .unwrap_or_else(|| DECLINED_MESSAGE.to_string());

                            warn!(intent = %pending.intent_id, %message, "card payment failed");

                            return Ok(self.fail(message, observer).await);
                        }
                        PaymentStatus::Pending | PaymentStatus::Canceled => {}
                    }
                }
                Err(error) if error.needs_login() => return Err(CheckoutError::ReauthRequired),
                Err(error) => {
                    warn!(intent = %pending.intent_id, %error, "payment status poll failed");
                }
            }

            if !self.timings.poll_delay.is_zero() {
                sleep(self.timings.poll_delay).await;
            }
        }
    }

    /// Ask the reader to abandon the intent. Returns whether it was cancelled;
    /// when it was not, polling carries on.
    async fn cancel<O>(
        &self,
        reader_name: &str,
        pending: &mut PendingCardPayment,
        observer: &mut O,
    ) -> Result<bool, CheckoutError>
    where
        O: CheckoutObserver + ?Sized,
    {
        observer.on_state(CheckoutState::CancelRequested);
        observer.on_message(CANCELLING_MESSAGE);
        observer.on_state(CheckoutState::Cancelling);

        let request = CancelPaymentRequest {
            reader_name: reader_name.to_string(),
            payment_intent_id: pending.intent_id.clone(),
        };

        let cancelled = with_reauth(&self.session, |token| {
            let backend = self.session.backend();
            let request = request.clone();
            async move { backend.cancel_payment(&token, &request).await }
        })
        .await;

        match cancelled {
            Ok(true) => {
                pending.status = PaymentStatus::Canceled;

                info!(intent = %pending.intent_id, "card payment cancelled");

                observer.on_state(CheckoutState::CanceledConfirmed);
                observer.on_message(CANCELLED_MESSAGE);

                self.dwell(self.timings.cancel_dwell).await;

                observer.on_state(CheckoutState::Idle);

                Ok(true)
            }
            Err(error) if error.needs_login() => Err(CheckoutError::ReauthRequired),
            other => {
                if let Err(error) = other {
                    warn!(intent = %pending.intent_id, %error, "cancel request failed");
                } else {
                    warn!(intent = %pending.intent_id, "reader did not cancel the payment");
                }

                observer.on_state(CheckoutState::CancelFailedStillPending);
                observer.on_message(CANCEL_FAILED_MESSAGE);
                observer.on_state(CheckoutState::AwaitingReader);

                Ok(false)
            }
        }
    }

    async fn complete<O>(
        &self,
        cart: &Cart,
        record: &PaymentStatusRecord,
        default_member: MemberId,
        observer: &mut O,
    ) -> CheckoutOutcome
    where
        O: CheckoutObserver + ?Sized,
    {
        observer.on_state(CheckoutState::Succeeded);
        observer.on_message(THANKS_MESSAGE);

        let (card, card_fingerprint) = card_from_record(record);
        let charge_id = record.payment_charge_id.clone().unwrap_or_default();

        info!(charge = %charge_id, %card, "card payment succeeded");

        let metadata = PaymentMetadata {
            member_id: default_member,
            card: card.clone(),
            charge_id: charge_id.clone(),
        };

        let submissions = self.submissions.submit(cart.items(), &metadata).await;

        if !submissions.is_complete() {
            error!(
                charge = %charge_id,
                failed = submissions.failures().count(),
                "some cart lines were not recorded"
            );
        }

        CheckoutOutcome::Completed(CompletedCheckout {
            charge_id,
            card,
            card_fingerprint,
            submissions,
        })
    }

    async fn fail<O>(&self, message: String, observer: &mut O) -> CheckoutOutcome
    where
        O: CheckoutObserver + ?Sized,
    {
        observer.on_state(CheckoutState::Failed);
        observer.on_message(&message);

        self.dwell(self.timings.failure_dwell).await;

        observer.on_state(CheckoutState::Idle);

        CheckoutOutcome::Failed { message }
    }

    async fn dwell(&self, duration: Duration) {
        if !duration.is_zero() {
            sleep(duration).await;
        }
    }
}
