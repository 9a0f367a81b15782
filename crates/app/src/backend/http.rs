//! HTTP client for the kiosk backend.

use std::time::Duration;

use async_trait::async_trait;
use kiosk::{
    ids::{AccountId, GroupId, MemberId, PaymentId},
    payments::PaymentIntentId,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::{
    backend::{
        AccountRecord, BackendError, BlockedDaysRecord, CancelPaymentRequest,
        CreatedPaymentRecord, DefaultMemberIds, GroupListing, InitiatePaymentRequest,
        KioskBackend, MemberQuery, MemberRecord, MoveDonationReply, MoveDonationRequest,
        NewMemberRequest, NewPaymentRequest, PaymentInitiation, PaymentStatusRecord, Reader,
        SettingsRecord, TokenGrant,
        models::{Envelope, value_message},
    },
    session::{AccessToken, OperatorPin},
};

/// Where the backend lives.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Scheme and host, e.g. `"https://temple.example.org"`.
    pub base_url: String,

    /// Prefix of kiosk endpoints (readers, payments, settings).
    pub kiosk_path: String,

    /// Prefix of public API endpoints (tokens, members, payment records).
    pub public_path: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpBackendConfig {
    fn join(&self, prefix: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = prefix.trim_matches('/');

        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }

    /// Root of the kiosk endpoints.
    pub fn kiosk_url(&self) -> String {
        self.join(&self.kiosk_path)
    }

    /// Root of the public API endpoints.
    pub fn public_url(&self) -> String {
        self.join(&self.public_path)
    }
}

/// [`KioskBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    kiosk_url: String,
    public_url: String,
    http: Client,
}

impl HttpBackend {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &HttpBackendConfig) -> Result<Self, BackendError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            kiosk_url: config.kiosk_url(),
            public_url: config.public_url(),
            http,
        })
    }

    fn kiosk(&self, path: &str) -> String {
        format!("{}/{path}", self.kiosk_url)
    }

    fn public(&self, path: &str) -> String {
        format!("{}/{path}", self.public_url)
    }

    /// Send, mapping 403 to [`BackendError::Unauthorized`]. Other statuses pass through.
    async fn dispatch(request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await?;

        if response.status() == StatusCode::FORBIDDEN {
            debug!(url = %response.url(), "access token rejected");

            return Err(BackendError::Unauthorized);
        }

        Ok(response)
    }

    /// Send and require a 2xx status.
    async fn checked(request: RequestBuilder) -> Result<Response, BackendError> {
        let response = Self::dispatch(request).await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(BackendError::Status { status, body });
        }

        Ok(response)
    }

    /// Send, require a 2xx status and unwrap a `{ status: 1, data }` envelope.
    async fn data<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
        let envelope: Envelope<T> = Self::checked(request).await?.json().await?;

        if envelope.status != 1 {
            return Err(BackendError::Rejected(envelope.failure_message()));
        }

        envelope
            .data
            .ok_or_else(|| BackendError::Rejected("response carried no data".to_string()))
    }

    /// Send, require a 2xx status and take `data`, whatever `status` says.
    async fn payload<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
        let envelope: Envelope<T> = Self::checked(request).await?.json().await?;

        match envelope.data {
            Some(data) => Ok(data),
            None => Err(BackendError::Rejected(envelope.failure_message())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,

    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedMember {
    sys_id: u64,
}

#[derive(Debug, Deserialize)]
struct CreatedPayment {
    #[serde(default)]
    id: Option<PaymentId>,
}

#[derive(Debug, Deserialize)]
struct CancelReply {
    #[serde(default)]
    is_payment_canceled: bool,
}

#[async_trait]
impl KioskBackend for HttpBackend {
    async fn exchange_pin(&self, pin: &OperatorPin) -> Result<TokenGrant, BackendError> {
        let url = self.public("oauth/token/");

        debug!(%url, "exchanging operator pin");

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", pin.expose()),
                ("client_secret", pin.expose()),
            ])
            .send()
            .await?;

        let body: TokenResponse = response.json().await?;

        Ok(TokenGrant {
            access_token: body
                .access_token
                .filter(|token| !token.is_empty())
                .map(AccessToken::new),
            error: body
                .error
                .filter(|error| !error.is_null())
                .map(|error| value_message(&error))
                .filter(|message| !message.is_empty()),
        })
    }

    async fn list_readers(&self, token: &AccessToken) -> Result<Vec<Reader>, BackendError> {
        Self::data(
            self.http
                .get(self.kiosk("readers/"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn default_member_ids(
        &self,
        token: &AccessToken,
    ) -> Result<DefaultMemberIds, BackendError> {
        Self::data(
            self.http
                .get(self.kiosk("get-default-member-ids/"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn settings(&self, token: &AccessToken) -> Result<SettingsRecord, BackendError> {
        Self::payload(
            self.http
                .get(self.kiosk("get-settings/"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn account_groups(&self, token: &AccessToken) -> Result<GroupListing, BackendError> {
        Self::payload(
            self.http
                .get(self.kiosk("groups/"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn group_accounts(
        &self,
        token: &AccessToken,
        group: GroupId,
    ) -> Result<Vec<AccountRecord>, BackendError> {
        Self::data(
            self.http
                .get(self.kiosk(&format!("{group}/accounts")))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn blocked_days(
        &self,
        token: &AccessToken,
        account: AccountId,
    ) -> Result<Vec<BlockedDaysRecord>, BackendError> {
        Self::payload(
            self.http
                .get(self.public(&format!("accounts/block-days/{account}/")))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn search_members(
        &self,
        token: &AccessToken,
        query: &MemberQuery,
    ) -> Result<Vec<MemberRecord>, BackendError> {
        Self::data(
            self.http
                .get(self.public("members/search/"))
                .query(&[query.query_pair()])
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn create_member(
        &self,
        token: &AccessToken,
        member: &NewMemberRequest,
    ) -> Result<MemberId, BackendError> {
        let created: CreatedMember = Self::data(
            self.http
                .post(self.public("members/"))
                .bearer_auth(token.expose())
                .json(member),
        )
        .await?;

        Ok(MemberId::new(created.sys_id))
    }

    async fn initiate_payment(
        &self,
        token: &AccessToken,
        request: &InitiatePaymentRequest,
    ) -> Result<PaymentInitiation, BackendError> {
        Self::payload(
            self.http
                .post(self.kiosk("pay/"))
                .bearer_auth(token.expose())
                .json(request),
        )
        .await
    }

    async fn payment_status(
        &self,
        token: &AccessToken,
        intent: &PaymentIntentId,
    ) -> Result<PaymentStatusRecord, BackendError> {
        let response = Self::dispatch(
            self.http
                .get(self.kiosk(&format!("check_payment_status/{intent}/")))
                .bearer_auth(token.expose()),
        )
        .await?;

        let envelope: Envelope<PaymentStatusRecord> = response.json().await?;

        if let Some(record) = envelope.data {
            return Ok(record);
        }

        match envelope.error {
            Some(error @ Value::Object(_)) => serde_json::from_value(error)
                .map_err(|source| BackendError::Rejected(source.to_string())),
            Some(error) => Err(BackendError::Rejected(value_message(&error))),
            None => Err(BackendError::Rejected(
                "status reply carried no data".to_string(),
            )),
        }
    }

    async fn cancel_payment(
        &self,
        token: &AccessToken,
        request: &CancelPaymentRequest,
    ) -> Result<bool, BackendError> {
        let response = Self::dispatch(
            self.http
                .post(self.kiosk("cancel-payment/"))
                .bearer_auth(token.expose())
                .json(request),
        )
        .await?;

        let envelope: Envelope<CancelReply> = response.json().await?;

        Ok(envelope
            .data
            .is_some_and(|reply| reply.is_payment_canceled))
    }

    async fn create_payment(
        &self,
        token: &AccessToken,
        request: &NewPaymentRequest,
    ) -> Result<CreatedPaymentRecord, BackendError> {
        let response = Self::dispatch(
            self.http
                .post(self.public("payments/"))
                .bearer_auth(token.expose())
                .json(request),
        )
        .await?;

        let envelope: Envelope<CreatedPayment> = response.json().await?;

        let message = (envelope.status != 1).then(|| envelope.failure_message());

        Ok(CreatedPaymentRecord {
            status: envelope.status,
            id: envelope.data.and_then(|created| created.id),
            message,
        })
    }

    async fn move_donation(
        &self,
        token: &AccessToken,
        request: &MoveDonationRequest,
    ) -> Result<MoveDonationReply, BackendError> {
        let response = Self::dispatch(
            self.http
                .post(self.kiosk("move-donation/"))
                .bearer_auth(token.expose())
                .json(request),
        )
        .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(MoveDonationReply {
            status,
            body: serde_json::from_str(&text).unwrap_or(Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        task::JoinHandle,
    };

    use super::*;

    /// Serves one canned `(status, body)` reply per connection, in order, and
    /// hands back the lowercased raw requests it received.
    async fn serve(
        replies: Vec<(u16, &'static str)>,
    ) -> TestResult<(HttpBackend, JoinHandle<std::io::Result<Vec<String>>>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            let mut requests = Vec::with_capacity(replies.len());

            for (status, body) in replies {
                let (mut stream, _) = listener.accept().await?;

                requests.push(read_request(&mut stream).await?);

                let response = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );

                stream.write_all(response.as_bytes()).await?;
                stream.shutdown().await?;
            }

            Ok::<_, std::io::Error>(requests)
        });

        let backend = HttpBackend::new(&config(&format!("http://{addr}")))?;

        Ok((backend, server))
    }

    async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 1024];

        loop {
            let read = stream.read(&mut chunk).await?;

            if read == 0 {
                break;
            }

            buffer.extend_from_slice(&chunk[..read]);

            if let Some(end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buffer[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);

                if buffer.len() >= end + 4 + length {
                    break;
                }
            }
        }

        Ok(String::from_utf8_lossy(&buffer).to_lowercase())
    }

    fn token() -> AccessToken {
        AccessToken::new("tok")
    }

    fn payment_request() -> InitiatePaymentRequest {
        InitiatePaymentRequest {
            reader_name: "Lobby".to_string(),
            amount: rust_decimal::Decimal::new(75, 0),
            custom_metadata: "{}".to_string(),
        }
    }

    fn config(base_url: &str) -> HttpBackendConfig {
        HttpBackendConfig {
            base_url: base_url.to_string(),
            kiosk_path: "swayam".to_string(),
            public_path: "/api/public/v1/".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn prefixes_are_joined_without_duplicate_slashes() {
        let config = config("https://temple.example.org/");

        assert_eq!(config.kiosk_url(), "https://temple.example.org/swayam");
        assert_eq!(
            config.public_url(),
            "https://temple.example.org/api/public/v1"
        );
    }

    #[test]
    fn endpoint_paths_hang_off_their_prefix() -> TestResult {
        let backend = HttpBackend::new(&config("http://localhost:8000"))?;

        assert_eq!(
            backend.kiosk("check_payment_status/pi_1/"),
            "http://localhost:8000/swayam/check_payment_status/pi_1/"
        );
        assert_eq!(
            backend.public("oauth/token/"),
            "http://localhost:8000/api/public/v1/oauth/token/"
        );

        Ok(())
    }

    #[tokio::test]
    async fn pin_is_exchanged_as_client_credentials() -> TestResult {
        let (backend, server) = serve(vec![(200, r#"{"access_token":"tok"}"#)]).await?;

        let grant = backend.exchange_pin(&OperatorPin::new("123456")).await?;
        let requests = server.await??;

        assert_eq!(grant.access_token.as_ref().map(AccessToken::expose), Some("tok"));
        assert_eq!(grant.error, None);
        assert!(requests[0].starts_with("post /api/public/v1/oauth/token/ "));
        assert!(requests[0].contains("content-type: application/x-www-form-urlencoded"));
        assert!(
            requests[0]
                .contains("grant_type=client_credentials&client_id=123456&client_secret=123456")
        );

        Ok(())
    }

    #[tokio::test]
    async fn refused_pin_surfaces_the_backend_error() -> TestResult {
        let (backend, server) =
            serve(vec![(401, r#"{"error":"invalid_client"}"#)]).await?;

        let grant = backend.exchange_pin(&OperatorPin::new("000000")).await?;
        server.await??;

        assert!(grant.access_token.is_none());
        assert_eq!(grant.error.as_deref(), Some("invalid_client"));

        Ok(())
    }

    #[tokio::test]
    async fn payment_initiation_without_status_is_accepted() -> TestResult {
        let (backend, server) = serve(vec![(
            200,
            r#"{"data":{"payment_intent_created":true,"payment_intent_id":"pi_1"}}"#,
        )])
        .await?;

        let initiation = backend
            .initiate_payment(&token(), &payment_request())
            .await?;
        let requests = server.await??;

        assert!(initiation.payment_intent_created);
        assert_eq!(
            initiation.payment_intent_id,
            Some(PaymentIntentId::new("pi_1"))
        );
        assert!(requests[0].starts_with("post /swayam/pay/ "));
        assert!(requests[0].contains("authorization: bearer tok"));

        Ok(())
    }

    #[tokio::test]
    async fn groups_settings_and_blocked_days_ignore_a_missing_status() -> TestResult {
        let (backend, server) = serve(vec![
            (
                200,
                r#"{"data":{"groups":[{"sys_id":3,"name":"Poojas"}],"other_available":true}}"#,
            ),
            (200, r#"{"data":{"theme":"saffron"}}"#),
            (
                200,
                r#"{"status":0,"data":[{"name":"Closed","start_date":"2025-03-01","end_date":"2025-03-02"}]}"#,
            ),
        ])
        .await?;

        let listing = backend.account_groups(&token()).await?;
        let settings = backend.settings(&token()).await?;
        let blocked = backend.blocked_days(&token(), AccountId::new(7)).await?;
        let requests = server.await??;

        assert_eq!(listing.groups.len(), 1);
        assert!(listing.other_available);
        assert_eq!(settings.theme.as_deref(), Some("saffron"));
        assert_eq!(blocked.len(), 1);
        assert!(requests[2].starts_with("get /api/public/v1/accounts/block-days/7/ "));

        Ok(())
    }

    #[tokio::test]
    async fn lenient_endpoints_still_need_data() -> TestResult {
        let (backend, server) = serve(vec![(200, r#"{"error":"reader offline"}"#)]).await?;

        let result = backend
            .initiate_payment(&token(), &payment_request())
            .await;
        server.await??;

        assert!(matches!(result, Err(BackendError::Rejected(message)) if message == "reader offline"));

        Ok(())
    }

    #[tokio::test]
    async fn readers_require_a_success_status() -> TestResult {
        let (backend, server) = serve(vec![
            (200, r#"{"status":0,"error":"no readers"}"#),
            (200, r#"{"data":[]}"#),
        ])
        .await?;

        let rejected = backend.list_readers(&token()).await;
        let missing_status = backend.list_readers(&token()).await;
        server.await??;

        assert!(matches!(rejected, Err(BackendError::Rejected(message)) if message == "no readers"));
        assert!(matches!(missing_status, Err(BackendError::Rejected(_))));

        Ok(())
    }

    #[tokio::test]
    async fn forbidden_is_unauthorized() -> TestResult {
        let (backend, server) = serve(vec![(403, r#"{"detail":"expired"}"#)]).await?;

        let result = backend.list_readers(&token()).await;
        server.await??;

        assert!(result.is_err_and(|error| error.is_unauthorized()));

        Ok(())
    }

    #[tokio::test]
    async fn server_errors_keep_status_and_body() -> TestResult {
        let (backend, server) = serve(vec![(500, "boom")]).await?;

        let result = backend.default_member_ids(&token()).await;
        server.await??;

        assert!(matches!(
            result,
            Err(BackendError::Status { status: 500, body }) if body == "boom"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn declined_status_is_read_from_the_error_object() -> TestResult {
        let (backend, server) = serve(vec![(
            400,
            r#"{"error":{"payment_status":"failed","error":"card declined"}}"#,
        )])
        .await?;

        let record = backend
            .payment_status(&token(), &PaymentIntentId::new("pi_1"))
            .await?;
        let requests = server.await??;

        assert_eq!(record.payment_status.as_deref(), Some("failed"));
        assert_eq!(record.error.as_deref(), Some("card declined"));
        assert!(requests[0].starts_with("get /swayam/check_payment_status/pi_1/ "));

        Ok(())
    }

    #[tokio::test]
    async fn cancellation_reports_the_reader_answer() -> TestResult {
        let (backend, server) = serve(vec![
            (200, r#"{"status":1,"data":{"is_payment_canceled":true}}"#),
            (200, r#"{"status":1,"data":{"is_payment_canceled":false}}"#),
        ])
        .await?;

        let request = CancelPaymentRequest {
            reader_name: "Lobby".to_string(),
            payment_intent_id: PaymentIntentId::new("pi_1"),
        };

        assert!(backend.cancel_payment(&token(), &request).await?);
        assert!(!backend.cancel_payment(&token(), &request).await?);

        let requests = server.await??;

        assert!(requests[0].contains(r#""payment_intent_id":"pi_1""#));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_payment_record_keeps_the_message() -> TestResult {
        let (backend, server) =
            serve(vec![(200, r#"{"status":0,"error":"Account is inactive"}"#)]).await?;

        let request = NewPaymentRequest {
            member_id: MemberId::new(1),
            account_id: AccountId::new(7),
            kind: crate::backend::CREDIT_CARD,
            amount: rust_decimal::Decimal::new(25, 0),
            details: "[visa ****4242]".to_string(),
            stripe_charge_id: "ch_1".to_string(),
            isdonationflow: true,
            alert: None,
        };

        let record = backend.create_payment(&token(), &request).await?;
        server.await??;

        assert_eq!(record.status, 0);
        assert_eq!(record.id, None);
        assert_eq!(record.message.as_deref(), Some("Account is inactive"));
        assert_eq!(record.created_id(), None);

        Ok(())
    }
}
