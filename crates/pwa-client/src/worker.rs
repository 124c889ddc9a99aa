//! Service worker controller.
//!
//! Owns the session's cached worker registration and exposes the
//! message-passing and notification-display operations on it.

use std::sync::Arc;

use serde_json::json;

use crate::ClientError;
use crate::host::{Host, WorkerHandle, WorkerPhase};

/// Well-known location of the worker script.
pub const WORKER_SCRIPT_URL: &str = "/sw.js";

/// Default notification icon. Some hosts ignore it and use the manifest
/// icon instead.
pub const DEFAULT_ICON: &str = "/img/pwa/bg.svg";

pub struct WorkerController {
    host: Arc<dyn Host>,
    handle: Option<WorkerHandle>,
}

impl WorkerController {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { host, handle: None }
    }

    pub fn handle(&self) -> Option<&WorkerHandle> {
        self.handle.as_ref()
    }

    /// Register the worker. Idempotent: a cached registration is returned
    /// without touching the host again.
    pub async fn register(&mut self) -> Result<WorkerHandle, ClientError> {
        if !self.host.supports_service_worker() {
            return Err(ClientError::UnsupportedEnvironment);
        }
        if let Some(handle) = &self.handle {
            return Ok(handle.clone());
        }

        let handle = self
            .host
            .register_worker(WORKER_SCRIPT_URL)
            .await
            .map_err(ClientError::RegistrationFailed)?;
        tracing::info!(scope = %handle.scope, "service worker registered");
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    /// Unregister and clear the cached handle. No-op without one.
    pub async fn unregister(&mut self) -> Result<(), ClientError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.host
            .unregister_worker(&handle)
            .await
            .map_err(ClientError::RegistrationFailed)?;
        tracing::info!(scope = %handle.scope, "service worker unregistered");
        Ok(())
    }

    /// Post a structured message to the worker. Fire-and-forget: fails
    /// silently with `false` when messaging is unavailable.
    pub fn send_message(&self, title: &str, body: Option<&str>) -> bool {
        if !self.host.supports_service_worker() {
            return false;
        }
        self.host
            .post_worker_message(json!({ "title": title, "body": body }))
    }

    /// Ask the worker to display a notification, registering it first if
    /// needed.
    ///
    /// Returns `Ok(false)` without any registration attempt when the host
    /// lacks worker support, and `NoActiveWorker` when registration did
    /// not yield a usable worker.
    pub async fn show_notification(
        &mut self,
        title: &str,
        body: Option<&str>,
    ) -> Result<bool, ClientError> {
        if !self.host.supports_service_worker() {
            return Ok(false);
        }

        let handle = self.register().await?;
        if handle.phase != WorkerPhase::Active {
            return Err(ClientError::NoActiveWorker);
        }

        self.host
            .show_worker_notification(&handle, title, body, DEFAULT_ICON)
            .await
            .map_err(|_| ClientError::NoActiveWorker)?;
        Ok(true)
    }
}
