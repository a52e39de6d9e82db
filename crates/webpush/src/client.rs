use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use tracing::debug;
use webpush_crypto::CONTENT_ENCODING as AES128GCM;
use webpush_keys::Signer;

use crate::error::PushError;
use crate::options::SendOptions;
use crate::subscription::Subscription;
use crate::transport::{PushRequest, PushTransport, ReqwestTransport};
use crate::vapid::{build_assertion, validate_subject};

const TTL: &str = "ttl";
const URGENCY: &str = "urgency";
const TOPIC: &str = "topic";

/// Sends encrypted, VAPID-signed push messages.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct PushClient {
    signer: Arc<dyn Signer>,
    subject: String,
    transport: Arc<dyn PushTransport>,
}

impl PushClient {
    /// `subject` is the operator contact (`mailto:` or `https:`) sent as the
    /// JWT `sub` claim.
    pub fn new(signer: Arc<dyn Signer>, subject: impl Into<String>) -> Result<Self, PushError> {
        let subject = subject.into();
        validate_subject(&subject)?;
        Ok(Self {
            signer,
            subject,
            transport: Arc::new(ReqwestTransport::default()),
        })
    }

    /// Replace the HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn PushTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies, pooling).
    pub fn with_http_client(self, client: reqwest::Client) -> Self {
        self.with_transport(Arc::new(ReqwestTransport::new(client)))
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    /// Encrypt `payload` for `subscription` and deliver it.
    ///
    /// Fails with [`PushError::PushRejected`] for any non-2xx answer. Nothing
    /// is retried; on 404/410 ([`PushError::is_subscription_gone`]) the caller
    /// should delete the stored subscription.
    pub async fn send(
        &self,
        subscription: &Subscription,
        payload: &[u8],
        options: &SendOptions,
    ) -> Result<(), PushError> {
        let endpoint = subscription.endpoint();
        if !endpoint.starts_with("https://") {
            return Err(PushError::InsecureEndpoint(endpoint.to_string()));
        }
        let mut headers = option_headers(options)?;

        let body = webpush_crypto::encrypt(
            subscription.client_public_key(),
            subscription.auth_secret(),
            payload,
        )?;
        let assertion = build_assertion(endpoint, &self.subject, self.signer.as_ref()).await?;

        headers.insert(AUTHORIZATION, header_value(assertion.header_value())?);
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(AES128GCM));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );

        let response = self
            .transport
            .post(PushRequest {
                endpoint: endpoint.to_string(),
                headers,
                body,
            })
            .await?;

        if !response.is_success() {
            return Err(PushError::PushRejected {
                status: response.status,
                body: response.body,
            });
        }
        debug!(endpoint, status = response.status, "push accepted");
        Ok(())
    }
}

impl fmt::Debug for PushClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushClient")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// `TTL`, and `Urgency`/`Topic` when set.
fn option_headers(options: &SendOptions) -> Result<HeaderMap, PushError> {
    let mut headers = HeaderMap::new();
    headers.insert(TTL, HeaderValue::from(options.ttl_or_default()));
    if let Some(urgency) = options.urgency {
        headers.insert(URGENCY, HeaderValue::from_static(urgency.as_str()));
    }
    if let Some(topic) = &options.topic {
        let value = HeaderValue::from_str(topic).map_err(|_| {
            PushError::InvalidOption(format!("topic is not a valid header value: {:?}", topic))
        })?;
        headers.insert(TOPIC, value);
    }
    Ok(headers)
}

fn header_value(value: String) -> Result<HeaderValue, PushError> {
    HeaderValue::try_from(value).map_err(|e| PushError::InvalidOption(e.to_string()))
}
