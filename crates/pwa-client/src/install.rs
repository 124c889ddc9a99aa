//! Install lifecycle tracker.
//!
//! A small state machine over the two host-delivered lifecycle signals
//! (prompt available, app installed) and the user-triggered prompt action.
//! Signals arrive over an explicit channel subscription the tracker owns
//! and tears down, never ad-hoc global listeners.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::ClientError;
use crate::host::{Host, InstallPrompt, InstallSignal, PromptOutcome};

/// Tracker states. `Installed` is terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallState {
    Idle,
    PromptAvailable,
    WaitingConfirm,
    Installing,
    Installed,
    Cancelled,
    Failed,
}

/// Flag view of the tracker state, shaped for the demo status surface.
///
/// At most one of `installing`/`cancelled`/`succeeded`/`failed` is true,
/// and `allowed` is false forever once `succeeded` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallStatus {
    pub allowed: bool,
    pub waiting_confirm: bool,
    pub installing: bool,
    pub cancelled: bool,
    pub succeeded: bool,
    pub failed: bool,
}

/// Tracks the installable-app lifecycle for one session.
pub struct InstallTracker {
    state: InstallState,
    prompt: Option<Box<dyn InstallPrompt>>,
    signals: Option<UnboundedReceiver<InstallSignal>>,
}

impl InstallTracker {
    /// Create the tracker, subscribing to the host's lifecycle signals.
    ///
    /// A host already in standalone display mode starts directly in
    /// `Installed` and never engages the prompt machinery.
    pub fn new(host: &dyn Host) -> Self {
        if host.is_standalone() {
            return Self {
                state: InstallState::Installed,
                prompt: None,
                signals: None,
            };
        }
        Self {
            state: InstallState::Idle,
            prompt: None,
            signals: Some(host.install_signals()),
        }
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    pub fn status(&self) -> InstallStatus {
        InstallStatus {
            allowed: matches!(
                self.state,
                InstallState::PromptAvailable | InstallState::Cancelled | InstallState::Failed
            ),
            waiting_confirm: self.state == InstallState::WaitingConfirm,
            installing: self.state == InstallState::Installing,
            cancelled: self.state == InstallState::Cancelled,
            succeeded: self.state == InstallState::Installed,
            failed: self.state == InstallState::Failed,
        }
    }

    /// Drain and apply pending host signals.
    pub fn pump(&mut self) {
        let mut pending = Vec::new();
        if let Some(rx) = self.signals.as_mut() {
            while let Ok(signal) = rx.try_recv() {
                pending.push(signal);
            }
        }
        for signal in pending {
            match signal {
                InstallSignal::PromptAvailable(handle) => self.on_prompt_available(handle),
                InstallSignal::Installed => self.on_installed(),
            }
        }
    }

    /// A fresh prompt capability arrived. A newer handle replaces a stored
    /// one; prompts delivered mid-install or after installation are dropped.
    pub fn on_prompt_available(&mut self, handle: Box<dyn InstallPrompt>) {
        match self.state {
            InstallState::Idle
            | InstallState::PromptAvailable
            | InstallState::Cancelled
            | InstallState::Failed => {
                self.prompt = Some(handle);
                self.state = InstallState::PromptAvailable;
            }
            InstallState::WaitingConfirm
            | InstallState::Installing
            | InstallState::Installed => {}
        }
    }

    /// The host reports the app as installed. Terminal; also tears down
    /// the signal subscription since install prompts are one-shot per
    /// page lifetime.
    pub fn on_installed(&mut self) {
        if self.state == InstallState::Installed {
            return;
        }
        self.state = InstallState::Installed;
        self.prompt = None;
        self.signals = None;
    }

    /// Ask the user to install. Consumes the stored prompt handle on every
    /// outcome.
    pub async fn prompt(&mut self) -> Result<InstallState, ClientError> {
        let handle = self.prompt.take().ok_or(ClientError::NoPromptAvailable)?;
        self.state = InstallState::WaitingConfirm;

        self.state = match handle.confirm().await {
            Ok(PromptOutcome::Accepted) => InstallState::Installing,
            Ok(PromptOutcome::Dismissed) => InstallState::Cancelled,
            Err(message) => {
                tracing::warn!(error = %message, "install prompt failed");
                InstallState::Failed
            }
        };
        Ok(self.state)
    }
}
