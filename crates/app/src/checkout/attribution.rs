//! Donation Attribution

use std::sync::Arc;

use kiosk::ids::{MemberId, PaymentId};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    backend::MoveDonationRequest,
    session::{KioskSession, SessionError, with_reauth},
};

/// Recorded when the token could not be renewed mid-attribution.
pub const SESSION_EXPIRED_MESSAGE: &str = "Please login again";

/// Outcome of moving one payment.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionResult {
    pub payment_id: PaymentId,

    /// HTTP status of the move request; `0` when no response was received.
    pub status: u16,

    pub success: bool,

    /// Response body, when one was received.
    pub response: Option<Value>,

    pub error: Option<String>,
}

/// Moves recorded payments from the placeholder member to the donor.
#[derive(Debug, Clone)]
pub struct DonationAttribution {
    session: Arc<KioskSession>,
}

impl DonationAttribution {
    pub fn new(session: Arc<KioskSession>) -> Self {
        Self { session }
    }

    /// Move every payment to `member`, one request at a time, in order.
    ///
    /// Every id is attempted regardless of earlier failures; the result has
    /// one entry per id.
    pub async fn attribute(
        &self,
        payment_ids: &[PaymentId],
        member: MemberId,
        card_fingerprint: Option<&str>,
    ) -> Vec<AttributionResult> {
        let card_fingerprint = card_fingerprint
            .map(str::trim)
            .filter(|fingerprint| !fingerprint.is_empty())
            .map(str::to_string);

        let mut results = Vec::with_capacity(payment_ids.len());

        for &payment_id in payment_ids {
            let request = MoveDonationRequest {
                new_donation_member: member,
                payment_id,
                card_fingerprint: card_fingerprint.clone(),
            };

            let reply = with_reauth(&self.session, |token| {
                let backend = self.session.backend();
                let request = request.clone();
                async move { backend.move_donation(&token, &request).await }
            })
            .await;

            let result = match reply {
                Ok(reply) => AttributionResult {
                    payment_id,
                    status: reply.status,
                    success: reply.is_success(),
                    response: Some(reply.body),
                    error: None,
                },
                Err(error) if error.needs_login() => AttributionResult {
                    payment_id,
                    status: 403,
                    success: false,
                    response: None,
                    error: Some(SESSION_EXPIRED_MESSAGE.to_string()),
                },
                Err(error) => AttributionResult {
                    payment_id,
                    status: 0,
                    success: false,
                    response: None,
                    error: Some(error.to_string()),
                },
            };

            if result.success {
                info!(payment = %payment_id, %member, "donation attributed");
            } else {
                warn!(
                    payment = %payment_id,
                    %member,
                    status = result.status,
                    "donation not attributed"
                );
            }

            results.push(result);
        }

        results
    }

    /// Move every payment to the anonymous member.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoDefaultMembers`] if the member ids were never loaded.
    pub async fn attribute_anonymously(
        &self,
        payment_ids: &[PaymentId],
    ) -> Result<Vec<AttributionResult>, SessionError> {
        let anonymous = self.session.anonymous_member().await?;

        Ok(self.attribute(payment_ids, anonymous, None).await)
    }
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        backend::{BackendError, MockKioskBackend, MoveDonationReply, TokenGrant},
        session::AccessToken,
        test::{ANONYMOUS_MEMBER, checkout_session},
    };

    use super::*;

    const DONOR: MemberId = MemberId::new(42);

    fn ok_reply() -> MoveDonationReply {
        MoveDonationReply {
            status: 200,
            body: json!({ "status": 1 }),
        }
    }

    #[tokio::test]
    async fn every_payment_is_attempted_in_order() {
        let mut backend = MockKioskBackend::new();
        let mut sequence = Sequence::new();

        for (id, reply) in [
            (901, Ok(ok_reply())),
            (
                902,
                Ok(MoveDonationReply {
                    status: 400,
                    body: json!({ "status": 0, "error": "payment not found" }),
                }),
            ),
            (
                903,
                Err(BackendError::Status {
                    status: 500,
                    body: String::new(),
                }),
            ),
        ] {
            let mut reply = Some(reply);

            backend
                .expect_move_donation()
                .withf(move |_, request| {
                    request.payment_id == PaymentId::new(id)
                        && request.new_donation_member == DONOR
                })
                .times(1)
                .in_sequence(&mut sequence)
                .returning(move |_, _| {
                    reply
                        .take()
                        .unwrap_or_else(|| Err(BackendError::Rejected("called twice".to_string())))
                });
        }

        let attribution = DonationAttribution::new(checkout_session(backend).await);

        let results = attribution
            .attribute(
                &[PaymentId::new(901), PaymentId::new(902), PaymentId::new(903)],
                DONOR,
                Some("fp_abc"),
            )
            .await;

        assert_eq!(results.len(), 3);

        assert!(results[0].success);
        assert_eq!(results[0].status, 200);

        assert!(!results[1].success);
        assert_eq!(results[1].status, 400);
        assert!(results[1].response.is_some());

        assert!(!results[2].success);
        assert_eq!(results[2].status, 0);
        assert!(results[2].error.is_some());
    }

    #[tokio::test]
    async fn blank_fingerprint_is_not_sent() {
        let mut backend = MockKioskBackend::new();

        backend
            .expect_move_donation()
            .withf(|_, request| request.card_fingerprint.is_none())
            .times(1)
            .returning(|_, _| Ok(ok_reply()));

        let attribution = DonationAttribution::new(checkout_session(backend).await);

        let results = attribution
            .attribute(&[PaymentId::new(901)], DONOR, Some(""))
            .await;

        assert!(results[0].success);
    }

    #[tokio::test]
    async fn expired_session_is_recorded_and_the_rest_still_run() {
        let mut backend = MockKioskBackend::new();

        backend
            .expect_move_donation()
            .withf(|_, request| request.payment_id == PaymentId::new(901))
            .returning(|_, _| Err(BackendError::Unauthorized));
        backend
            .expect_move_donation()
            .withf(|_, request| request.payment_id == PaymentId::new(902))
            .times(1)
            .returning(|_, _| Ok(ok_reply()));

        let mut refreshes = 0;
        backend.expect_exchange_pin().returning(move |_| {
            refreshes += 1;

            Ok(if refreshes == 1 {
                TokenGrant::default()
            } else {
                TokenGrant {
                    access_token: Some(AccessToken::new("fresh")),
                    error: None,
                }
            })
        });

        let attribution = DonationAttribution::new(checkout_session(backend).await);

        let results = attribution
            .attribute(&[PaymentId::new(901), PaymentId::new(902)], DONOR, None)
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, 403);
        assert_eq!(results[0].error.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
        assert!(results[1].success);
    }

    #[tokio::test]
    async fn anonymous_donations_go_to_the_anonymous_member() -> TestResult {
        let mut backend = MockKioskBackend::new();

        backend
            .expect_move_donation()
            .withf(|_, request| {
                request.new_donation_member == ANONYMOUS_MEMBER
                    && request.card_fingerprint.is_none()
            })
            .times(2)
            .returning(|_, _| Ok(ok_reply()));

        let attribution = DonationAttribution::new(checkout_session(backend).await);

        let results = attribution
            .attribute_anonymously(&[PaymentId::new(901), PaymentId::new(902)])
            .await?;

        assert!(results.iter().all(|result| result.success));

        Ok(())
    }
}
