//! In-memory simulated host.
//!
//! Backs the test suite and the demo server: capabilities and failure
//! modes are configurable, host interactions are counted, and every
//! displayed notification is recorded with its delivery source.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, ready};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::host::{
    Host, InstallPrompt, InstallSignal, NotificationPermission, PromptOutcome, PushSubscription,
    SubscriptionKeys, WorkerHandle, WorkerPhase,
};
use crate::runtime::NotificationSink;

/// Which delivery path produced a displayed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverySource {
    Local,
    Worker,
    Push,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayedNotification {
    pub source: DeliverySource,
    pub title: String,
    pub body: Option<String>,
}

/// Shared record of everything the simulated host displayed.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<DisplayedNotification>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, source: DeliverySource, title: &str, body: Option<&str>) {
        self.entries.lock().unwrap().push(DisplayedNotification {
            source,
            title: title.into(),
            body: body.map(Into::into),
        });
    }

    pub fn entries(&self) -> Vec<DisplayedNotification> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Adapter routing worker-runtime displays into a [`MemorySink`] as
/// push-delivered notifications.
pub struct PushDisplay {
    sink: Arc<MemorySink>,
}

impl PushDisplay {
    pub fn new(sink: Arc<MemorySink>) -> Self {
        Self { sink }
    }
}

impl NotificationSink for PushDisplay {
    fn display(&self, title: &str, body: Option<&str>) {
        self.sink.record(DeliverySource::Push, title, body);
    }
}

/// Scripted install prompt handle.
pub struct SimPrompt {
    outcome: Result<PromptOutcome, String>,
}

impl SimPrompt {
    pub fn new(outcome: Result<PromptOutcome, String>) -> Self {
        Self { outcome }
    }
}

impl InstallPrompt for SimPrompt {
    fn confirm(self: Box<Self>) -> BoxFuture<'static, Result<PromptOutcome, String>> {
        Box::pin(ready(self.outcome))
    }
}

#[derive(Default)]
struct SimState {
    permission_override: Option<NotificationPermission>,
    registration: Option<WorkerHandle>,
    registrations: u32,
    subscribe_calls: u32,
    existing_queries: u32,
    last_subscribe: Option<(String, bool)>,
    posted_messages: Vec<serde_json::Value>,
    install_tx: Option<mpsc::UnboundedSender<InstallSignal>>,
}

/// Configurable simulated host. Build with the `with_*`/`without_*`
/// methods before sharing it behind an `Arc`.
pub struct SimHost {
    notifications: bool,
    service_worker: bool,
    push: bool,
    https: bool,
    standalone: bool,
    permission: NotificationPermission,
    permission_response: NotificationPermission,
    register_error: Option<String>,
    subscribe_error: Option<String>,
    register_phase: WorkerPhase,
    subscription: Option<PushSubscription>,
    existing: Option<PushSubscription>,
    sink: Arc<MemorySink>,
    state: Mutex<SimState>,
}

impl SimHost {
    /// A fully capable host: everything supported, secure context, prompt
    /// requests resolve to `Granted`.
    pub fn new() -> Self {
        Self {
            notifications: true,
            service_worker: true,
            push: true,
            https: true,
            standalone: false,
            permission: NotificationPermission::Default,
            permission_response: NotificationPermission::Granted,
            register_error: None,
            subscribe_error: None,
            register_phase: WorkerPhase::Active,
            subscription: None,
            existing: None,
            sink: MemorySink::new(),
            state: Mutex::new(SimState::default()),
        }
    }

    pub fn without_notifications(mut self) -> Self {
        self.notifications = false;
        self
    }

    pub fn without_service_worker(mut self) -> Self {
        self.service_worker = false;
        self
    }

    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    pub fn insecure(mut self) -> Self {
        self.https = false;
        self
    }

    pub fn standalone(mut self) -> Self {
        self.standalone = true;
        self
    }

    pub fn with_permission(mut self, permission: NotificationPermission) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_permission_response(mut self, response: NotificationPermission) -> Self {
        self.permission_response = response;
        self
    }

    pub fn failing_registration(mut self, message: &str) -> Self {
        self.register_error = Some(message.into());
        self
    }

    pub fn failing_subscribe(mut self, message: &str) -> Self {
        self.subscribe_error = Some(message.into());
        self
    }

    /// Workers come up stuck in the given phase instead of `Active`.
    pub fn with_register_phase(mut self, phase: WorkerPhase) -> Self {
        self.register_phase = phase;
        self
    }

    /// Subscription the push service hands out on subscribe.
    pub fn with_subscription(mut self, subscription: PushSubscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Pre-existing subscription reported by the push service.
    pub fn with_existing_subscription(mut self, subscription: PushSubscription) -> Self {
        self.existing = Some(subscription);
        self
    }

    pub fn with_sink(mut self, sink: Arc<MemorySink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn sink(&self) -> Arc<MemorySink> {
        self.sink.clone()
    }

    /// Deliver a prompt-available signal carrying a scripted outcome.
    /// Returns false when no tracker subscription is listening.
    pub fn deliver_prompt(&self, outcome: Result<PromptOutcome, String>) -> bool {
        let state = self.state.lock().unwrap();
        match &state.install_tx {
            Some(tx) => tx
                .send(InstallSignal::PromptAvailable(Box::new(SimPrompt::new(
                    outcome,
                ))))
                .is_ok(),
            None => false,
        }
    }

    /// Deliver an app-installed signal.
    pub fn deliver_installed(&self) -> bool {
        let state = self.state.lock().unwrap();
        match &state.install_tx {
            Some(tx) => tx.send(InstallSignal::Installed).is_ok(),
            None => false,
        }
    }

    pub fn registration_count(&self) -> u32 {
        self.state.lock().unwrap().registrations
    }

    pub fn subscribe_count(&self) -> u32 {
        self.state.lock().unwrap().subscribe_calls
    }

    pub fn existing_query_count(&self) -> u32 {
        self.state.lock().unwrap().existing_queries
    }

    pub fn last_subscribe(&self) -> Option<(String, bool)> {
        self.state.lock().unwrap().last_subscribe.clone()
    }

    pub fn posted_messages(&self) -> Vec<serde_json::Value> {
        self.state.lock().unwrap().posted_messages.clone()
    }

    fn fabricate_subscription() -> PushSubscription {
        PushSubscription {
            endpoint: "https://push.example/sub".into(),
            keys: SubscriptionKeys {
                auth: "auth-secret".into(),
                p256dh: "p256dh-key".into(),
            },
        }
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for SimHost {
    fn supports_notifications(&self) -> bool {
        self.notifications
    }

    fn supports_service_worker(&self) -> bool {
        self.service_worker
    }

    fn supports_push(&self) -> bool {
        self.push
    }

    fn is_secure_context(&self) -> bool {
        self.https
    }

    fn is_standalone(&self) -> bool {
        self.standalone
    }

    fn notification_permission(&self) -> NotificationPermission {
        self.state
            .lock()
            .unwrap()
            .permission_override
            .unwrap_or(self.permission)
    }

    fn request_permission(&self) -> BoxFuture<'_, NotificationPermission> {
        let response = self.permission_response;
        self.state.lock().unwrap().permission_override = Some(response);
        Box::pin(ready(response))
    }

    fn install_signals(&self) -> mpsc::UnboundedReceiver<InstallSignal> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().unwrap().install_tx = Some(tx);
        rx
    }

    fn register_worker<'a>(
        &'a self,
        _script_url: &'a str,
    ) -> BoxFuture<'a, Result<WorkerHandle, String>> {
        let result = if let Some(message) = &self.register_error {
            Err(message.clone())
        } else {
            let mut state = self.state.lock().unwrap();
            state.registrations += 1;
            let handle = WorkerHandle {
                scope: "/".into(),
                phase: self.register_phase,
            };
            state.registration = Some(handle.clone());
            Ok(handle)
        };
        Box::pin(ready(result))
    }

    fn unregister_worker<'a>(
        &'a self,
        _handle: &'a WorkerHandle,
    ) -> BoxFuture<'a, Result<(), String>> {
        self.state.lock().unwrap().registration = None;
        Box::pin(ready(Ok(())))
    }

    fn post_worker_message(&self, payload: serde_json::Value) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.registration.is_none() {
            return false;
        }
        state.posted_messages.push(payload);
        true
    }

    fn show_worker_notification<'a>(
        &'a self,
        _handle: &'a WorkerHandle,
        title: &'a str,
        body: Option<&'a str>,
        _icon: &'a str,
    ) -> BoxFuture<'a, Result<(), String>> {
        self.sink.record(DeliverySource::Worker, title, body);
        Box::pin(ready(Ok(())))
    }

    fn show_local_notification(&self, title: &str, body: &str, _icon: &str) {
        self.sink.record(DeliverySource::Local, title, Some(body));
    }

    fn subscribe_push<'a>(
        &'a self,
        _handle: &'a WorkerHandle,
        application_server_key: &'a str,
        user_visible_only: bool,
    ) -> BoxFuture<'a, Result<PushSubscription, String>> {
        let result = if let Some(message) = &self.subscribe_error {
            Err(message.clone())
        } else {
            let mut state = self.state.lock().unwrap();
            state.subscribe_calls += 1;
            state.last_subscribe = Some((application_server_key.into(), user_visible_only));
            Ok(self
                .subscription
                .clone()
                .unwrap_or_else(Self::fabricate_subscription))
        };
        Box::pin(ready(result))
    }

    fn existing_subscription<'a>(
        &'a self,
        _handle: &'a WorkerHandle,
    ) -> BoxFuture<'a, Option<PushSubscription>> {
        self.state.lock().unwrap().existing_queries += 1;
        Box::pin(ready(self.existing.clone()))
    }
}
