//! Payment Submission

use std::sync::Arc;

use kiosk::{
    cart::{CartLineItem, EntryId},
    ids::{AccountId, MemberId, PaymentId},
    payments::CardDescriptor,
};
use tracing::{info, warn};

use crate::{
    backend::{CREDIT_CARD, NewPaymentRequest},
    session::{KioskSession, with_reauth},
};

/// What every payment record created for one charge shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMetadata {
    /// Member the records are created against.
    pub member_id: MemberId,

    /// Masked card.
    pub card: CardDescriptor,

    /// Processor charge id.
    pub charge_id: String,
}

/// Outcome of recording one cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub entry_id: EntryId,
    pub account_id: AccountId,
    pub payment_id: Option<PaymentId>,
    pub error: Option<String>,
}

impl SubmissionResult {
    pub fn succeeded(&self) -> bool {
        self.payment_id.is_some()
    }
}

/// Results of a submission pass, in cart order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    results: Vec<SubmissionResult>,
}

impl SubmissionReport {
    pub fn results(&self) -> &[SubmissionResult] {
        &self.results
    }

    /// Ids of the records that were created, in cart order.
    pub fn payment_ids(&self) -> Vec<PaymentId> {
        self.results
            .iter()
            .filter_map(|result| result.payment_id)
            .collect()
    }

    /// Lines that were not recorded.
    pub fn failures(&self) -> impl Iterator<Item = &SubmissionResult> {
        self.results.iter().filter(|result| !result.succeeded())
    }

    /// Whether every line was recorded.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(SubmissionResult::succeeded)
    }
}

/// Records one payment per cart line, one request at a time.
#[derive(Debug, Clone)]
pub struct PaymentSubmissionPipeline {
    session: Arc<KioskSession>,
}

impl PaymentSubmissionPipeline {
    pub fn new(session: Arc<KioskSession>) -> Self {
        Self { session }
    }

    /// Submit every line in order. A failed line is recorded in the report
    /// and never stops the lines after it.
    pub async fn submit(
        &self,
        items: &[CartLineItem],
        metadata: &PaymentMetadata,
    ) -> SubmissionReport {
        let details = metadata.card.to_string();
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            let request = NewPaymentRequest {
                member_id: metadata.member_id,
                account_id: item.account_id(),
                kind: CREDIT_CARD,
                amount: item.amount(),
                details: details.clone(),
                stripe_charge_id: metadata.charge_id.clone(),
                isdonationflow: true,
                alert: item.formatted_alert_date(),
            };

            let result = with_reauth(&self.session, |token| {
                let backend = self.session.backend();
                let request = request.clone();
                async move { backend.create_payment(&token, &request).await }
            })
            .await;

            let (payment_id, error) = match result {
                Ok(record) => match record.created_id() {
                    Some(id) => (Some(id), None),
                    None => (
                        None,
                        Some(
                            record
                                .message
                                .unwrap_or_else(|| "payment record was not created".to_string()),
                        ),
                    ),
                },
                Err(error) => (None, Some(error.to_string())),
            };

            match (&payment_id, &error) {
                (Some(id), _) => {
                    info!(
                        entry = %item.entry_id(),
                        account = %item.account_id(),
                        payment = %id,
                        "payment recorded"
                    );
                }
                (None, reason) => {
                    warn!(
                        entry = %item.entry_id(),
                        account = %item.account_id(),
                        reason = reason.as_deref().unwrap_or_default(),
                        "payment not recorded"
                    );
                }
            }

            results.push(SubmissionResult {
                entry_id: item.entry_id(),
                account_id: item.account_id(),
                payment_id,
                error,
            });
        }

        SubmissionReport { results }
    }
}
