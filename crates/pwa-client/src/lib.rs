//! Client-side core of the notification demo.
//!
//! Provides the capability probe, install lifecycle tracker, service worker
//! controller, push subscription manager, and the notification dispatch
//! facade, all written against the [`host::Host`] seam so they run equally
//! against a real browser bridge or the in-memory simulated host.

pub mod capability;
pub mod dispatch;
pub mod host;
pub mod install;
pub mod relay;
pub mod runtime;
pub mod sim;
pub mod subscription;
pub mod worker;

#[cfg(test)]
mod tests;

pub use capability::Capabilities;
pub use dispatch::{DispatchPath, Dispatcher};
pub use host::{
    Host, InstallPrompt, InstallSignal, NotificationPermission, PromptOutcome, PushSubscription,
    SubscriptionKeys, WorkerHandle, WorkerPhase,
};
pub use install::{InstallState, InstallStatus, InstallTracker};
pub use relay::{HttpRelayClient, RelayReceipt, RelayRequest, RelaySender};
pub use runtime::{NotificationSink, WorkerEvent};
pub use subscription::SubscriptionManager;
pub use worker::WorkerController;

/// Unified error type for the client core.
///
/// Every failure is a value the presentation layer can render; nothing here
/// is fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not supported in this environment")]
    UnsupportedEnvironment,

    #[error("notification permission denied")]
    PermissionDenied,

    #[error("no install prompt available")]
    NoPromptAvailable,

    #[error("no active service worker")]
    NoActiveWorker,

    #[error("worker registration failed: {0}")]
    RegistrationFailed(String),

    #[error("push subscription failed: {0}")]
    SubscriptionFailed(String),

    #[error("push relay error (status {status}): {message}")]
    Relay { status: u16, message: String },
}
