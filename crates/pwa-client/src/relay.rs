//! Typed client for the Push Relay Endpoint.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::ClientError;
use crate::host::PushSubscription;

/// Relay request body. The subscription travels under the field name
/// `permission`, the name the relay RPC contract uses on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub title: String,
    pub description: String,
    pub permission: PushSubscription,
}

/// Relay response: an opaque delivery receipt from the push service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayReceipt {
    pub success: bool,
    pub response: serde_json::Value,
}

/// Seam for sending relay requests, mockable in tests.
pub trait RelaySender: Send + Sync {
    fn push<'a>(&'a self, request: &'a RelayRequest)
    -> BoxFuture<'a, Result<RelayReceipt, ClientError>>;
}

/// HTTP relay client posting to the demo server.
pub struct HttpRelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRelayClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }
}

impl RelaySender for HttpRelayClient {
    fn push<'a>(
        &'a self,
        request: &'a RelayRequest,
    ) -> BoxFuture<'a, Result<RelayReceipt, ClientError>> {
        Box::pin(async move {
            let url = format!("{}/api/push", self.base_url.trim_end_matches('/'));
            let resp = self.http.post(&url).json(request).send().await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await?;
                return Err(ClientError::Relay {
                    status: status.as_u16(),
                    message,
                });
            }
            Ok(resp.json::<RelayReceipt>().await?)
        })
    }
}
