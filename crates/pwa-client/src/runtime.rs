//! Background worker event runtime.
//!
//! Models the worker-context side of the system: an event loop over the
//! three inbound events (`install`, `message`, `push`) with notification
//! display behind an injected sink.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;

/// Events delivered into the worker context. Fire-and-forget; there is no
/// ordering guarantee between in-flight events.
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Message(serde_json::Value),
    Push(Option<Vec<u8>>),
}

/// Where the worker displays notifications.
pub trait NotificationSink: Send + Sync {
    fn display(&self, title: &str, body: Option<&str>);
}

const EVENT_QUEUE_CAPACITY: usize = 100;

/// Start the worker event loop. Returns the sender used to deliver events
/// into the worker context.
pub fn start_worker(sink: Arc<dyn NotificationSink>) -> mpsc::Sender<WorkerEvent> {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    tokio::spawn(event_loop(rx, sink));
    tracing::info!("worker event loop started");
    tx
}

pub(crate) async fn event_loop(
    mut rx: mpsc::Receiver<WorkerEvent>,
    sink: Arc<dyn NotificationSink>,
) {
    while let Some(event) = rx.recv().await {
        match event {
            WorkerEvent::Install => tracing::info!("worker installed"),
            WorkerEvent::Message(payload) => {
                tracing::info!(%payload, "worker message received");
            }
            WorkerEvent::Push(payload) => handle_push(payload.as_deref(), &*sink),
        }
    }
    tracing::info!("worker event loop stopped");
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
}

/// A well-formed push produces exactly one display call; a missing or
/// non-JSON payload produces none and is logged as an error.
pub(crate) fn handle_push(payload: Option<&[u8]>, sink: &dyn NotificationSink) {
    let Some(data) = payload else {
        tracing::error!("push event data is missing");
        return;
    };
    match serde_json::from_slice::<PushPayload>(data) {
        Ok(parsed) => sink.display(
            parsed.title.as_deref().unwrap_or_default(),
            parsed.body.as_deref(),
        ),
        Err(e) => tracing::error!("push payload is not valid JSON: {e}"),
    }
}
