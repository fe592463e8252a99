use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. The device gate has already passed if this is reachable.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "alert-bridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
