use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, ready};
use serde_json::json;

use super::sim;
use crate::ClientError;
use crate::dispatch::{DispatchPath, Dispatcher};
use crate::host::{NotificationPermission, PushSubscription, SubscriptionKeys};
use crate::relay::{RelayReceipt, RelayRequest, RelaySender};
use crate::sim::{DeliverySource, SimHost};

const APP_KEY: &str = "BNcR-application-server-key";

#[derive(Default)]
struct RecordingRelay {
    requests: Mutex<Vec<RelayRequest>>,
}

impl RecordingRelay {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn requests(&self) -> Vec<RelayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl RelaySender for RecordingRelay {
    fn push<'a>(
        &'a self,
        request: &'a RelayRequest,
    ) -> BoxFuture<'a, Result<RelayReceipt, ClientError>> {
        self.requests.lock().unwrap().push(request.clone());
        Box::pin(ready(Ok(RelayReceipt {
            success: true,
            response: json!({ "statusCode": 201, "body": "" }),
        })))
    }
}

fn dispatcher(host: Arc<SimHost>, relay: Arc<RecordingRelay>) -> Dispatcher {
    Dispatcher::new(host, relay, APP_KEY)
}

#[tokio::test]
async fn local_path_requires_granted_permission() {
    let host = sim(SimHost::new());
    let mut dispatcher = dispatcher(host.clone(), RecordingRelay::new());

    let result = dispatcher.dispatch(DispatchPath::Local, "Hi", "there").await;
    assert!(matches!(result, Err(ClientError::PermissionDenied)));
    assert_eq!(host.sink().count(), 0);
}

#[tokio::test]
async fn local_path_displays_when_granted() {
    let host = sim(SimHost::new().with_permission(NotificationPermission::Granted));
    let mut dispatcher = dispatcher(host.clone(), RecordingRelay::new());

    dispatcher
        .dispatch(DispatchPath::Local, "Hi", "there")
        .await
        .unwrap();

    let entries = host.sink().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, DeliverySource::Local);
    assert_eq!(entries[0].title, "Hi");
    assert_eq!(entries[0].body.as_deref(), Some("there"));
}

#[tokio::test]
async fn local_path_fails_without_notification_support() {
    let host = sim(SimHost::new().without_notifications());
    let mut dispatcher = dispatcher(host.clone(), RecordingRelay::new());

    let result = dispatcher.dispatch(DispatchPath::Local, "Hi", "there").await;
    assert!(matches!(result, Err(ClientError::UnsupportedEnvironment)));
}

#[tokio::test]
async fn worker_path_displays_through_the_worker() {
    let host = sim(SimHost::new());
    let mut dispatcher = dispatcher(host.clone(), RecordingRelay::new());

    dispatcher
        .dispatch(DispatchPath::Worker, "Hi", "there")
        .await
        .unwrap();

    let entries = host.sink().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, DeliverySource::Worker);
}

#[tokio::test]
async fn worker_path_fails_without_worker_support() {
    let host = sim(SimHost::new().without_service_worker());
    let mut dispatcher = dispatcher(host.clone(), RecordingRelay::new());

    let result = dispatcher.dispatch(DispatchPath::Worker, "Hi", "there").await;
    assert!(matches!(result, Err(ClientError::UnsupportedEnvironment)));
    assert_eq!(host.registration_count(), 0);
}

#[tokio::test]
async fn push_path_relays_the_cached_subscription() {
    let host = sim(SimHost::new());
    let relay = RecordingRelay::new();
    let mut dispatcher = dispatcher(host.clone(), relay.clone());

    dispatcher
        .dispatch(DispatchPath::Push, "Hi", "there")
        .await
        .unwrap();
    dispatcher
        .dispatch(DispatchPath::Push, "Again", "later")
        .await
        .unwrap();

    // One registration, one subscription, two relayed requests.
    assert_eq!(host.registration_count(), 1);
    assert_eq!(host.subscribe_count(), 1);

    let requests = relay.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].title, "Hi");
    assert_eq!(requests[0].description, "there");
    assert_eq!(requests[0].permission, requests[1].permission);
}

#[tokio::test]
async fn unregister_invalidates_the_subscription() {
    let host = sim(SimHost::new());
    let relay = RecordingRelay::new();
    let mut dispatcher = dispatcher(host.clone(), relay.clone());

    dispatcher
        .dispatch(DispatchPath::Push, "Hi", "there")
        .await
        .unwrap();
    dispatcher.unregister_worker().await.unwrap();
    assert!(dispatcher.subscription().is_none());

    dispatcher
        .dispatch(DispatchPath::Push, "Hi", "there")
        .await
        .unwrap();
    assert_eq!(host.subscribe_count(), 2);
}

#[tokio::test]
async fn register_worker_adopts_an_existing_subscription() {
    let stored = PushSubscription {
        endpoint: "https://push.example/stored".into(),
        keys: SubscriptionKeys {
            auth: "stored-auth".into(),
            p256dh: "stored-p256dh".into(),
        },
    };
    let host = sim(SimHost::new().with_existing_subscription(stored.clone()));
    let relay = RecordingRelay::new();
    let mut dispatcher = dispatcher(host.clone(), relay.clone());

    dispatcher.register_worker().await.unwrap();
    assert_eq!(dispatcher.subscription(), Some(&stored));

    dispatcher
        .dispatch(DispatchPath::Push, "Hi", "there")
        .await
        .unwrap();
    assert_eq!(host.subscribe_count(), 0);
    assert_eq!(relay.requests()[0].permission, stored);
}

#[tokio::test]
async fn request_permission_maps_denial_to_error() {
    let host = sim(SimHost::new().with_permission_response(NotificationPermission::Denied));
    let denied = dispatcher(host.clone(), RecordingRelay::new());

    let result = denied.request_permission().await;
    assert!(matches!(result, Err(ClientError::PermissionDenied)));

    let host = sim(SimHost::new());
    let granted = dispatcher(host, RecordingRelay::new());
    assert_eq!(
        granted.request_permission().await.unwrap(),
        NotificationPermission::Granted
    );
}
