//! Notification dispatch facade.
//!
//! One call contract over the three delivery paths: a direct local
//! notification, a worker-displayed notification, and a server-relayed
//! push notification. Owns the session's worker controller and
//! subscription manager so UI code holds a single context object instead
//! of module-level singletons.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ClientError;
use crate::capability::Capabilities;
use crate::host::{Host, NotificationPermission, PushSubscription, WorkerHandle};
use crate::relay::{RelayRequest, RelaySender};
use crate::subscription::SubscriptionManager;
use crate::worker::{DEFAULT_ICON, WorkerController};

/// The three delivery mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchPath {
    Local,
    Worker,
    Push,
}

pub struct Dispatcher {
    host: Arc<dyn Host>,
    relay: Arc<dyn RelaySender>,
    worker: WorkerController,
    subscriptions: SubscriptionManager,
}

impl Dispatcher {
    pub fn new(
        host: Arc<dyn Host>,
        relay: Arc<dyn RelaySender>,
        application_server_key: &str,
    ) -> Self {
        Self {
            worker: WorkerController::new(host.clone()),
            subscriptions: SubscriptionManager::new(host.clone(), application_server_key.into()),
            host,
            relay,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::probe(&*self.host)
    }

    pub fn permission(&self) -> NotificationPermission {
        self.host.notification_permission()
    }

    pub fn worker_handle(&self) -> Option<&WorkerHandle> {
        self.worker.handle()
    }

    pub fn subscription(&self) -> Option<&PushSubscription> {
        self.subscriptions.cached()
    }

    /// Show the user consent prompt. A denial maps to `PermissionDenied`;
    /// re-prompting is only meaningful from a new user gesture.
    pub async fn request_permission(&self) -> Result<NotificationPermission, ClientError> {
        if !self.host.supports_notifications() {
            return Err(ClientError::UnsupportedEnvironment);
        }
        match self.host.request_permission().await {
            NotificationPermission::Denied => Err(ClientError::PermissionDenied),
            permission => Ok(permission),
        }
    }

    /// Register the worker and adopt any pre-existing subscription for it.
    pub async fn register_worker(&mut self) -> Result<WorkerHandle, ClientError> {
        let handle = self.worker.register().await?;
        self.subscriptions.get_existing(Some(&handle)).await;
        Ok(handle)
    }

    /// Release the worker registration. The cached subscription is a
    /// back-reference to it and is invalidated along with it.
    pub async fn unregister_worker(&mut self) -> Result<(), ClientError> {
        self.worker.unregister().await?;
        self.subscriptions.invalidate();
        Ok(())
    }

    pub fn send_worker_message(&self, title: &str, body: Option<&str>) -> bool {
        self.worker.send_message(title, body)
    }

    /// Deliver a notification over the chosen path.
    pub async fn dispatch(
        &mut self,
        path: DispatchPath,
        title: &str,
        body: &str,
    ) -> Result<(), ClientError> {
        match path {
            DispatchPath::Local => self.dispatch_local(title, body),
            DispatchPath::Worker => self.dispatch_worker(title, body).await,
            DispatchPath::Push => self.dispatch_push(title, body).await,
        }
    }

    fn dispatch_local(&self, title: &str, body: &str) -> Result<(), ClientError> {
        if !self.host.supports_notifications() {
            return Err(ClientError::UnsupportedEnvironment);
        }
        if self.host.notification_permission() != NotificationPermission::Granted {
            return Err(ClientError::PermissionDenied);
        }
        self.host.show_local_notification(title, body, DEFAULT_ICON);
        Ok(())
    }

    async fn dispatch_worker(&mut self, title: &str, body: &str) -> Result<(), ClientError> {
        if self.worker.show_notification(title, Some(body)).await? {
            Ok(())
        } else {
            // The silent-false contract is the controller's; at the facade
            // an unusable path is an error the UI hides the action behind.
            Err(ClientError::UnsupportedEnvironment)
        }
    }

    async fn dispatch_push(&mut self, title: &str, body: &str) -> Result<(), ClientError> {
        let handle = self.worker.register().await?;
        let subscription = self
            .subscriptions
            .request_subscription(Some(&handle))
            .await?;

        let request = RelayRequest {
            title: title.into(),
            description: body.into(),
            permission: subscription,
        };
        let receipt = self.relay.push(&request).await?;
        tracing::debug!(success = receipt.success, "push relayed");
        Ok(())
    }
}
