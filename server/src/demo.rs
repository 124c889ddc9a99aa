//! In-process demo session.
//!
//! Wires the client core to a simulated host whose fabricated push
//! subscription points back at this server's push-service sink, so a
//! relayed push travels the full wire path: dispatch facade → relay
//! endpoint → encrypted delivery → sink decrypt → worker event →
//! displayed notification.

use std::sync::Arc;

use tokio::sync::mpsc;

use pwa_client::sim::{MemorySink, PushDisplay, SimHost};
use pwa_client::{
    Dispatcher, HttpRelayClient, InstallStatus, InstallTracker, PromptOutcome, PushSubscription,
    SubscriptionKeys, WorkerEvent, runtime,
};
use webpush::ReceiverKeys;

use crate::config::AppConfig;

pub struct DemoSession {
    host: Arc<SimHost>,
    pub tracker: InstallTracker,
    pub dispatcher: Dispatcher,
    receiver: ReceiverKeys,
    subscription_id: String,
    worker_tx: mpsc::Sender<WorkerEvent>,
    sink: Arc<MemorySink>,
}

impl DemoSession {
    pub fn new(config: &AppConfig) -> Self {
        let sink = MemorySink::new();
        let receiver = ReceiverKeys::generate();
        let subscription_id = uuid::Uuid::new_v4().to_string();

        let subscription = PushSubscription {
            endpoint: format!(
                "http://127.0.0.1:{}/demo/push-service/{}",
                config.server_port, subscription_id
            ),
            keys: SubscriptionKeys {
                auth: receiver.auth_b64(),
                p256dh: receiver.p256dh_b64(),
            },
        };

        let host = Arc::new(
            SimHost::new()
                .with_sink(sink.clone())
                .with_subscription(subscription),
        );
        let tracker = InstallTracker::new(&*host);
        let relay = Arc::new(HttpRelayClient::new(format!(
            "http://127.0.0.1:{}",
            config.server_port
        )));
        let dispatcher = Dispatcher::new(host.clone(), relay, &config.vapid_public_key);
        let worker_tx = runtime::start_worker(Arc::new(PushDisplay::new(sink.clone())));

        Self {
            host,
            tracker,
            dispatcher,
            receiver,
            subscription_id,
            worker_tx,
            sink,
        }
    }

    /// Inject a prompt-available signal and apply it. Returns false once
    /// the tracker no longer listens (installed).
    pub fn deliver_prompt(&mut self, outcome: Result<PromptOutcome, String>) -> bool {
        let delivered = self.host.deliver_prompt(outcome);
        self.tracker.pump();
        delivered
    }

    /// Inject the app-installed signal and apply it.
    pub fn deliver_installed(&mut self) {
        self.host.deliver_installed();
        self.tracker.pump();
    }

    pub fn install_status(&mut self) -> InstallStatus {
        self.tracker.pump();
        self.tracker.status()
    }

    pub fn receiver_keys(&self) -> ReceiverKeys {
        self.receiver.clone()
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn worker_sender(&self) -> mpsc::Sender<WorkerEvent> {
        self.worker_tx.clone()
    }

    pub fn sink(&self) -> Arc<MemorySink> {
        self.sink.clone()
    }
}
