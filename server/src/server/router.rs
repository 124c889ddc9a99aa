use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::api;
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- Push relay ---
        .route("/api/push", post(api::push::push))
        .route("/api/vapid-key", get(api::push::vapid_key))
        // --- Demo: install lifecycle ---
        .route("/demo/install/available", post(api::demo::install_available))
        .route("/demo/install/prompt", post(api::demo::install_prompt))
        .route("/demo/install/installed", post(api::demo::install_installed))
        // --- Demo: worker & permission ---
        .route("/demo/worker/register", post(api::demo::register_worker))
        .route("/demo/worker/unregister", post(api::demo::unregister_worker))
        .route("/demo/worker/message", post(api::demo::send_worker_message))
        .route("/demo/permission", post(api::demo::request_permission))
        // --- Demo: dispatch & readback ---
        .route("/demo/dispatch", post(api::demo::dispatch))
        .route("/demo/status", get(api::demo::demo_status))
        .route("/demo/notifications", get(api::demo::recent_notifications))
        // --- Push service sink ---
        .route("/demo/push-service/{id}", post(api::demo::push_service_sink))
        // --- Middleware ---
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": "1.0.0"
    }))
}
