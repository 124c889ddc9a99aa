//! Push subscription manager.
//!
//! Obtains and caches the session's push subscription from the host push
//! service. The cache is a back-reference to the worker registration: it
//! is invalidated when the registration goes away, but never owns it.

use std::sync::Arc;

use crate::ClientError;
use crate::host::{Host, PushSubscription, WorkerHandle, WorkerPhase};

pub struct SubscriptionManager {
    host: Arc<dyn Host>,
    application_server_key: String,
    cached: Option<PushSubscription>,
    queried_existing: bool,
}

impl SubscriptionManager {
    pub fn new(host: Arc<dyn Host>, application_server_key: String) -> Self {
        Self {
            host,
            application_server_key,
            cached: None,
            queried_existing: false,
        }
    }

    pub fn cached(&self) -> Option<&PushSubscription> {
        self.cached.as_ref()
    }

    /// Obtain a subscription, reusing the session cache when present.
    ///
    /// Subscribes with `user_visible_only` fixed to true: the platform
    /// requires every push to surface a user-visible notification, and
    /// this system never silently drops one.
    pub async fn request_subscription(
        &mut self,
        worker: Option<&WorkerHandle>,
    ) -> Result<PushSubscription, ClientError> {
        if let Some(subscription) = &self.cached {
            return Ok(subscription.clone());
        }

        let worker = worker
            .filter(|w| w.phase == WorkerPhase::Active)
            .ok_or(ClientError::NoActiveWorker)?;
        if !self.host.supports_push() {
            return Err(ClientError::UnsupportedEnvironment);
        }

        let subscription = self
            .host
            .subscribe_push(worker, &self.application_server_key, true)
            .await
            .map_err(ClientError::SubscriptionFailed)?;
        tracing::info!(endpoint = %subscription.endpoint, "push subscription obtained");
        self.cached = Some(subscription.clone());
        Ok(subscription)
    }

    /// Adopt a subscription left over from a previous session, if the push
    /// service still has one for this registration.
    ///
    /// The underlying query runs at most once per worker-handle lifetime;
    /// repeated calls return the cache without re-querying.
    pub async fn get_existing(
        &mut self,
        worker: Option<&WorkerHandle>,
    ) -> Option<PushSubscription> {
        if self.cached.is_some() {
            return self.cached.clone();
        }
        let worker = worker?;
        if self.queried_existing {
            return None;
        }
        self.queried_existing = true;

        if let Some(subscription) = self.host.existing_subscription(worker).await {
            tracing::info!(endpoint = %subscription.endpoint, "adopted existing push subscription");
            self.cached = Some(subscription);
        }
        self.cached.clone()
    }

    /// Drop session state. Called when the owning worker registration is
    /// released; the subscription does not survive it.
    pub fn invalidate(&mut self) {
        self.cached = None;
        self.queried_existing = false;
    }
}
