use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, mpsc};
use tokio_util::sync::CancellationToken;

use pwa_client::WorkerEvent;
use pwa_client::sim::MemorySink;
use webpush::{PushClient, ReceiverKeys};

use crate::config::AppConfig;
use crate::demo::DemoSession;

/// Application shared state accessible from all axum handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration (immutable for the process lifetime)
    config: AppConfig,
    /// Outbound Web Push client with the server's VAPID identity
    push: PushClient,
    /// The demo client session
    demo: Mutex<DemoSession>,
    /// Push-service sink state, kept outside the demo lock so delivery
    /// does not re-enter it while a dispatch holds it
    receiver: ReceiverKeys,
    subscription_id: String,
    worker_tx: mpsc::Sender<WorkerEvent>,
    notifications: Arc<MemorySink>,
    /// Cancels the server's graceful shutdown future
    shutdown: CancellationToken,
}

impl SharedState {
    pub fn new(config: AppConfig, push: PushClient, demo: DemoSession) -> Self {
        let receiver = demo.receiver_keys();
        let subscription_id = demo.subscription_id().to_string();
        let worker_tx = demo.worker_sender();
        let notifications = demo.sink();

        Self {
            inner: Arc::new(SharedStateInner {
                config,
                push,
                demo: Mutex::new(demo),
                receiver,
                subscription_id,
                worker_tx,
                notifications,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn push(&self) -> &PushClient {
        &self.inner.push
    }

    pub async fn demo(&self) -> MutexGuard<'_, DemoSession> {
        self.inner.demo.lock().await
    }

    pub fn receiver_keys(&self) -> &ReceiverKeys {
        &self.inner.receiver
    }

    pub fn subscription_id(&self) -> &str {
        &self.inner.subscription_id
    }

    pub fn worker_sender(&self) -> mpsc::Sender<WorkerEvent> {
        self.inner.worker_tx.clone()
    }

    pub fn notifications(&self) -> &MemorySink {
        &self.inner.notifications
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }
}
