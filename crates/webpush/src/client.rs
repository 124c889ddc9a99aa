//! HTTP delivery of encrypted push messages to a subscription endpoint.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

use crate::WebPushError;
use crate::ece;
use crate::keys::SubscriberKeys;
use crate::vapid::VapidSigner;

/// Message time-to-live at the push service: 4 weeks.
pub const DEFAULT_TTL_SECS: u32 = 2_419_200;

/// Opaque delivery receipt returned by the push service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushReceipt {
    pub status_code: u16,
    pub body: String,
}

/// Outbound Web Push client bound to one VAPID identity.
pub struct PushClient {
    http: reqwest::Client,
    signer: VapidSigner,
}

impl PushClient {
    pub fn new(signer: VapidSigner) -> Self {
        Self {
            http: reqwest::Client::new(),
            signer,
        }
    }

    pub fn signer(&self) -> &VapidSigner {
        &self.signer
    }

    /// Encrypt a payload to the subscription keys without delivering it.
    pub fn encrypt(
        &self,
        p256dh: &str,
        auth: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>, WebPushError> {
        let keys = SubscriberKeys::parse(p256dh, auth)?;
        ece::encrypt(&keys, payload)
    }

    /// Encrypt, sign, and POST a payload to the subscription endpoint.
    ///
    /// A 404/410 response means the subscription no longer exists at the
    /// push service; the caller should have the client re-subscribe before
    /// any retry.
    pub async fn send(
        &self,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
        payload: &[u8],
    ) -> Result<PushReceipt, WebPushError> {
        let url = Url::parse(endpoint)?;
        let body = self.encrypt(p256dh, auth, payload)?;
        let authorization = self.signer.authorization(&url)?;

        tracing::debug!(endpoint, bytes = body.len(), "delivering push message");

        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_ENCODING, "aes128gcm")
            .header("TTL", DEFAULT_TTL_SECS.to_string())
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(WebPushError::EndpointGone(status.as_u16()));
        }
        if !status.is_success() {
            return Err(WebPushError::Delivery {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(PushReceipt {
            status_code: status.as_u16(),
            body: text,
        })
    }
}
