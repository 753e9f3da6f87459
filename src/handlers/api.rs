//! Health check endpoint

use axum::Json;
use serde_json::{Value, json};

/// Handler for GET / - liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "handover-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
