//! Push Relay Endpoint:
//!   POST /api/push       – sign, encrypt, and forward a push message
//!   GET  /api/vapid-key  – expose the public application server key

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use pwa_client::PushSubscription;
use webpush::WebPushError;

use crate::app::SharedState;

use super::err_json;

type ApiResult = Result<Json<Value>, (axum::http::StatusCode, Json<Value>)>;

/// Relay request body. The subscription arrives under the field name
/// `permission`, matching the client relay contract.
#[derive(Debug, Deserialize)]
pub struct PushRelayRequest {
    title: String,
    #[serde(default)]
    description: String,
    permission: PushSubscription,
}

/// POST /api/push – validate, then deliver `{ title, body }` to the
/// subscription endpoint via Web Push.
///
/// Validation failures reject before any network call. A push-service
/// rejection is surfaced verbatim and never retried: the subscription is
/// likely stale and the client must re-subscribe first.
pub async fn push(
    State(state): State<SharedState>,
    Json(body): Json<PushRelayRequest>,
) -> ApiResult {
    if body.title.is_empty() {
        return Err(err_json(400, "title must not be empty"));
    }
    if Url::parse(&body.permission.endpoint).is_err() {
        return Err(err_json(400, "subscription endpoint is not a valid URL"));
    }

    let payload = json!({ "title": body.title, "body": body.description }).to_string();
    let keys = &body.permission.keys;

    if state.config().dry_run_mode {
        let encrypted = state
            .push()
            .encrypt(&keys.p256dh, &keys.auth, payload.as_bytes())
            .map_err(|e| err_json(400, &e.to_string()))?;
        tracing::info!(
            endpoint = %body.permission.endpoint,
            bytes = encrypted.len(),
            "dry run: push validated and encrypted, not delivered"
        );
        return Ok(Json(json!({
            "success": true,
            "response": { "statusCode": 0, "body": "dry-run" }
        })));
    }

    match state
        .push()
        .send(
            &body.permission.endpoint,
            &keys.p256dh,
            &keys.auth,
            payload.as_bytes(),
        )
        .await
    {
        Ok(receipt) => Ok(Json(json!({ "success": true, "response": receipt }))),
        Err(WebPushError::EndpointGone(status)) => Err(err_json(
            410,
            &format!("subscription endpoint gone (status {status})"),
        )),
        Err(e @ WebPushError::InvalidKey(_)) => Err(err_json(400, &e.to_string())),
        Err(e) => {
            tracing::warn!("push delivery failed: {e}");
            Err(err_json(502, &e.to_string()))
        }
    }
}

/// GET /api/vapid-key – the application server key clients subscribe with.
pub async fn vapid_key(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({ "publicKey": state.config().vapid_public_key }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::demo::DemoSession;
    use pwa_client::SubscriptionKeys;
    use webpush::{PushClient, ReceiverKeys, VapidKeys, VapidSigner};

    fn dry_run_state() -> (SharedState, ReceiverKeys) {
        let keys = VapidKeys::generate();
        let config = AppConfig::load(|key| match key {
            "PUSH_PUBLIC_KEY" => Some(keys.public_key_b64().to_string()),
            "PUSH_PRIVATE_KEY" => Some(keys.private_key_b64()),
            "DRY_RUN_MODE" => Some("true".into()),
            _ => None,
        })
        .unwrap();

        let push = PushClient::new(VapidSigner::new(keys, config.vapid_contact.clone()));
        let demo = DemoSession::new(&config);
        let receiver = demo.receiver_keys();
        (SharedState::new(config, push, demo), receiver)
    }

    fn valid_request(receiver: &ReceiverKeys) -> PushRelayRequest {
        PushRelayRequest {
            title: "Hi".into(),
            description: "there".into(),
            permission: PushSubscription {
                endpoint: "https://push.example/abc".into(),
                keys: SubscriptionKeys {
                    auth: receiver.auth_b64(),
                    p256dh: receiver.p256dh_b64(),
                },
            },
        }
    }

    #[tokio::test]
    async fn empty_title_is_rejected_before_delivery() {
        let (state, receiver) = dry_run_state();
        let mut request = valid_request(&receiver);
        request.title = String::new();

        let (status, _) = push(State(state), Json(request)).await.unwrap_err();
        assert_eq!(status.as_u16(), 400);
    }

    #[tokio::test]
    async fn malformed_endpoint_is_rejected_before_delivery() {
        let (state, receiver) = dry_run_state();
        let mut request = valid_request(&receiver);
        request.permission.endpoint = "not a url".into();

        let (status, _) = push(State(state), Json(request)).await.unwrap_err();
        assert_eq!(status.as_u16(), 400);
    }

    #[tokio::test]
    async fn valid_request_succeeds_in_dry_run() {
        let (state, receiver) = dry_run_state();
        let response = push(State(state), Json(valid_request(&receiver)))
            .await
            .unwrap();
        assert_eq!(response.0["success"], true);
    }

    #[tokio::test]
    async fn bad_subscription_keys_are_a_validation_error() {
        let (state, receiver) = dry_run_state();
        let mut request = valid_request(&receiver);
        request.permission.keys = SubscriptionKeys {
            auth: "AAAA".into(),
            p256dh: "AAAA".into(),
        };

        let (status, _) = push(State(state), Json(request)).await.unwrap_err();
        assert_eq!(status.as_u16(), 400);
    }

    #[tokio::test]
    async fn vapid_key_exposes_the_public_half() {
        let (state, _) = dry_run_state();
        let expected = state.config().vapid_public_key.clone();
        let response = vapid_key(State(state)).await;
        assert_eq!(response.0["publicKey"], expected.as_str());
    }
}
