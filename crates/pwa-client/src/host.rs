//! The host environment seam.
//!
//! Everything the core needs from a browser-like host is expressed here as
//! a trait plus the handle types that cross it. Production wires a real
//! host bridge; tests and the demo server wire [`crate::sim::SimHost`].

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// User decision reported by an install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Accepted,
    Dismissed,
}

/// Single-use install prompt capability.
///
/// Captured from a host "prompt available" signal and consumed by exactly
/// one confirmation request; the host will not reissue it without a fresh
/// page load.
pub trait InstallPrompt: Send {
    fn confirm(self: Box<Self>) -> BoxFuture<'static, Result<PromptOutcome, String>>;
}

/// Install lifecycle signals delivered by the host.
pub enum InstallSignal {
    PromptAvailable(Box<dyn InstallPrompt>),
    Installed,
}

/// Lifecycle phase of a registered worker. The phases are mutually
/// exclusive; only an `Active` worker can display notifications or
/// hold a push subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerPhase {
    Installing,
    Waiting,
    Active,
}

/// A registered background worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerHandle {
    pub scope: String,
    pub phase: WorkerPhase,
}

/// Key pair half of a push subscription, base64url-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub auth: String,
    pub p256dh: String,
}

/// Bearer credential issued by the push service for one worker
/// registration. Does not own the registration; unregistering the worker
/// invalidates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Notification permission as the host reports it. Externally owned; the
/// core only reads and requests it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Default,
    Granted,
    Denied,
}

/// Host-environment operations the core depends on.
///
/// Suspending methods are exactly the ones that cross a host-API boundary;
/// everything else is a synchronous read of host state.
pub trait Host: Send + Sync {
    fn supports_notifications(&self) -> bool;
    fn supports_service_worker(&self) -> bool;
    fn supports_push(&self) -> bool;
    fn is_secure_context(&self) -> bool;

    /// True when running in a standalone/installed display mode.
    fn is_standalone(&self) -> bool;

    fn notification_permission(&self) -> NotificationPermission;

    /// Show the user consent prompt and resolve to the new permission.
    fn request_permission(&self) -> BoxFuture<'_, NotificationPermission>;

    /// Subscribe to install lifecycle signals. The returned receiver is
    /// owned by the subscriber and closes the subscription when dropped.
    fn install_signals(&self) -> mpsc::UnboundedReceiver<InstallSignal>;

    fn register_worker<'a>(
        &'a self,
        script_url: &'a str,
    ) -> BoxFuture<'a, Result<WorkerHandle, String>>;

    fn unregister_worker<'a>(
        &'a self,
        handle: &'a WorkerHandle,
    ) -> BoxFuture<'a, Result<(), String>>;

    /// Fire-and-forget message post to the worker context. Returns false
    /// when no messaging channel is available.
    fn post_worker_message(&self, payload: serde_json::Value) -> bool;

    fn show_worker_notification<'a>(
        &'a self,
        handle: &'a WorkerHandle,
        title: &'a str,
        body: Option<&'a str>,
        icon: &'a str,
    ) -> BoxFuture<'a, Result<(), String>>;

    fn show_local_notification(&self, title: &str, body: &str, icon: &str);

    fn subscribe_push<'a>(
        &'a self,
        handle: &'a WorkerHandle,
        application_server_key: &'a str,
        user_visible_only: bool,
    ) -> BoxFuture<'a, Result<PushSubscription, String>>;

    fn existing_subscription<'a>(
        &'a self,
        handle: &'a WorkerHandle,
    ) -> BoxFuture<'a, Option<PushSubscription>>;
}
