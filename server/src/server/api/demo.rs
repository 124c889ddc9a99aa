//! Demo surface: drives the client core against the in-process simulated
//! host, plus the push-service sink the fabricated subscription points at.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use pwa_client::{ClientError, DispatchPath, PromptOutcome, WorkerEvent};

use crate::app::SharedState;

use super::err_json;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn client_error_response(e: ClientError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        ClientError::UnsupportedEnvironment => 400,
        ClientError::PermissionDenied => 403,
        ClientError::NoPromptAvailable | ClientError::NoActiveWorker => 409,
        ClientError::Relay { status, .. } => *status,
        _ => 500,
    };
    err_json(status, &e.to_string())
}

#[derive(Debug, Default, Deserialize)]
pub struct InstallAvailableRequest {
    #[serde(default)]
    outcome: PromptChoice,
}

/// What the scripted prompt will resolve to when confirmed.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PromptChoice {
    #[default]
    Accepted,
    Dismissed,
    Failed,
}

/// POST /demo/install/available – inject a prompt-available signal.
pub async fn install_available(
    State(state): State<SharedState>,
    Json(body): Json<InstallAvailableRequest>,
) -> ApiResult {
    let mut demo = state.demo().await;
    let outcome = match body.outcome {
        PromptChoice::Accepted => Ok(PromptOutcome::Accepted),
        PromptChoice::Dismissed => Ok(PromptOutcome::Dismissed),
        PromptChoice::Failed => Err("install failed".to_string()),
    };
    if !demo.deliver_prompt(outcome) {
        return Err(err_json(409, "install signals are no longer accepted"));
    }
    Ok(Json(json!({ "status": "ok", "install": demo.install_status() })))
}

/// POST /demo/install/prompt – trigger the stored install prompt.
pub async fn install_prompt(State(state): State<SharedState>) -> ApiResult {
    let mut demo = state.demo().await;
    demo.tracker.pump();
    let state_after = demo
        .tracker
        .prompt()
        .await
        .map_err(client_error_response)?;
    Ok(Json(json!({
        "status": "ok",
        "state": state_after,
        "install": demo.tracker.status()
    })))
}

/// POST /demo/install/installed – inject the app-installed signal.
pub async fn install_installed(State(state): State<SharedState>) -> ApiResult {
    let mut demo = state.demo().await;
    demo.deliver_installed();
    Ok(Json(json!({ "status": "ok", "install": demo.install_status() })))
}

/// POST /demo/worker/register
pub async fn register_worker(State(state): State<SharedState>) -> ApiResult {
    let mut demo = state.demo().await;
    let handle = demo
        .dispatcher
        .register_worker()
        .await
        .map_err(client_error_response)?;
    Ok(Json(json!({ "status": "ok", "worker": handle })))
}

/// POST /demo/worker/unregister
pub async fn unregister_worker(State(state): State<SharedState>) -> ApiResult {
    let mut demo = state.demo().await;
    demo.dispatcher
        .unregister_worker()
        .await
        .map_err(client_error_response)?;
    Ok(Json(json!({ "status": "ok" })))
}

#[derive(Debug, Deserialize)]
pub struct WorkerMessageRequest {
    title: String,
    #[serde(default)]
    body: Option<String>,
}

/// POST /demo/worker/message – fire-and-forget message to the worker.
pub async fn send_worker_message(
    State(state): State<SharedState>,
    Json(body): Json<WorkerMessageRequest>,
) -> ApiResult {
    let demo = state.demo().await;
    let sent = demo
        .dispatcher
        .send_worker_message(&body.title, body.body.as_deref());
    Ok(Json(json!({ "status": "ok", "sent": sent })))
}

/// POST /demo/permission – show the consent prompt.
pub async fn request_permission(State(state): State<SharedState>) -> ApiResult {
    let demo = state.demo().await;
    let permission = demo
        .dispatcher
        .request_permission()
        .await
        .map_err(client_error_response)?;
    Ok(Json(json!({ "status": "ok", "permission": permission })))
}

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    path: DispatchPath,
    title: String,
    #[serde(default)]
    body: String,
}

/// POST /demo/dispatch – deliver a notification over the chosen path.
pub async fn dispatch(
    State(state): State<SharedState>,
    Json(body): Json<DispatchRequest>,
) -> ApiResult {
    let mut demo = state.demo().await;
    demo.dispatcher
        .dispatch(body.path, &body.title, &body.body)
        .await
        .map_err(client_error_response)?;
    Ok(Json(json!({ "status": "ok", "path": body.path })))
}

/// GET /demo/status – capabilities, install status, and session state.
pub async fn demo_status(State(state): State<SharedState>) -> ApiResult {
    let mut demo = state.demo().await;
    let install = demo.install_status();
    Ok(Json(json!({
        "status": "ok",
        "capabilities": demo.dispatcher.capabilities(),
        "install": install,
        "permission": demo.dispatcher.permission(),
        "worker": demo.dispatcher.worker_handle(),
        "subscription": demo.dispatcher.subscription(),
        "pushMobileOnly": state.config().push_mobile_only,
    })))
}

/// GET /demo/notifications – recently displayed notifications with their
/// delivery source.
pub async fn recent_notifications(State(state): State<SharedState>) -> ApiResult {
    Ok(Json(json!({
        "status": "ok",
        "notifications": state.notifications().entries(),
    })))
}

/// POST /demo/push-service/{id} – the in-process push service sink.
///
/// Accepts the relay's encrypted POST, decrypts with the simulated
/// subscription's keys, and forwards the plaintext as a push event into
/// the worker runtime.
pub async fn push_service_sink(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if id != state.subscription_id() {
        return Err(err_json(404, "unknown subscription"));
    }

    let plaintext = webpush::ece::decrypt(state.receiver_keys(), &body)
        .map_err(|e| err_json(400, &e.to_string()))?;

    state
        .worker_sender()
        .send(WorkerEvent::Push(Some(plaintext)))
        .await
        .map_err(|_| err_json(500, "worker event loop is gone"))?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "ok" }))))
}
